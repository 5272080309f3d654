use crate::error::EngineError;
use crate::types::{ActionParams, CallPayload, ProtocolAction, ProtocolCategory};

use alloy::primitives::U256;

/// One on-chain DeFi venue: fixed name, module address, and category, plus
/// the logic to turn an `(action, params)` request into a chain call payload.
///
/// Payload building is a pure function of the inputs and the descriptor's
/// fixed metadata. Descriptors are constructed once at registry setup and
/// immutable afterward.
pub trait ProtocolDescriptor: Send + Sync {
    fn name(&self) -> &str;
    fn address(&self) -> &str;
    fn category(&self) -> ProtocolCategory;
    fn supports(&self, action: ProtocolAction) -> bool;
    fn build_payload(
        &self,
        action: ProtocolAction,
        params: &ActionParams,
    ) -> Result<CallPayload, EngineError>;
}

fn function_id(address: &str, action: ProtocolAction) -> String {
    format!("{}::scripts::{}", address, action.entry_function())
}

/// A decentralized exchange. Supports swap and liquidity actions only.
pub struct DexProtocol {
    name: String,
    address: String,
}

impl DexProtocol {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl ProtocolDescriptor for DexProtocol {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn category(&self) -> ProtocolCategory {
        ProtocolCategory::Dex
    }

    fn supports(&self, action: ProtocolAction) -> bool {
        matches!(
            action,
            ProtocolAction::Swap | ProtocolAction::AddLiquidity | ProtocolAction::RemoveLiquidity
        )
    }

    fn build_payload(
        &self,
        action: ProtocolAction,
        params: &ActionParams,
    ) -> Result<CallPayload, EngineError> {
        match action {
            ProtocolAction::Swap => {
                let ActionParams::Swap {
                    token_in,
                    token_out,
                    amount_in,
                    min_amount_out,
                } = params
                else {
                    return Err(EngineError::InvalidParams {
                        action,
                        expected: "swap",
                    });
                };
                Ok(CallPayload {
                    function_id: function_id(&self.address, action),
                    type_arguments: vec![token_in.clone(), token_out.clone()],
                    arguments: vec![amount_in.to_string(), min_amount_out.to_string()],
                })
            }
            ProtocolAction::AddLiquidity => {
                let ActionParams::Liquidity {
                    token_a,
                    token_b,
                    amount_a,
                    amount_b,
                    min_lp_tokens,
                } = params
                else {
                    return Err(EngineError::InvalidParams {
                        action,
                        expected: "liquidity",
                    });
                };
                let min_lp = (*min_lp_tokens).unwrap_or(U256::ZERO);
                Ok(CallPayload {
                    function_id: function_id(&self.address, action),
                    type_arguments: vec![token_a.clone(), token_b.clone()],
                    arguments: vec![
                        amount_a.to_string(),
                        amount_b.to_string(),
                        min_lp.to_string(),
                    ],
                })
            }
            ProtocolAction::RemoveLiquidity => {
                let ActionParams::Liquidity {
                    token_a,
                    token_b,
                    amount_a,
                    amount_b,
                    ..
                } = params
                else {
                    return Err(EngineError::InvalidParams {
                        action,
                        expected: "liquidity",
                    });
                };
                Ok(CallPayload {
                    function_id: function_id(&self.address, action),
                    type_arguments: vec![token_a.clone(), token_b.clone()],
                    arguments: vec![amount_a.to_string(), amount_b.to_string()],
                })
            }
            _ => Err(EngineError::UnsupportedAction {
                protocol: self.name.clone(),
                action,
            }),
        }
    }
}

/// A lending market. Supports supply, borrow, and repay only.
pub struct LendingProtocol {
    name: String,
    address: String,
}

impl LendingProtocol {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl ProtocolDescriptor for LendingProtocol {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn category(&self) -> ProtocolCategory {
        ProtocolCategory::Lending
    }

    fn supports(&self, action: ProtocolAction) -> bool {
        matches!(
            action,
            ProtocolAction::Supply | ProtocolAction::Borrow | ProtocolAction::Repay
        )
    }

    fn build_payload(
        &self,
        action: ProtocolAction,
        params: &ActionParams,
    ) -> Result<CallPayload, EngineError> {
        let ActionParams::Lending {
            token,
            amount,
            interest_rate,
        } = params
        else {
            if !self.supports(action) {
                return Err(EngineError::UnsupportedAction {
                    protocol: self.name.clone(),
                    action,
                });
            }
            return Err(EngineError::InvalidParams {
                action,
                expected: "lending",
            });
        };
        match action {
            ProtocolAction::Supply | ProtocolAction::Repay => Ok(CallPayload {
                function_id: function_id(&self.address, action),
                type_arguments: vec![token.clone()],
                arguments: vec![amount.to_string()],
            }),
            ProtocolAction::Borrow => {
                // Caller-supplied desired rate, defaults to 0. Not computed here.
                let rate = (*interest_rate).unwrap_or(0.0);
                Ok(CallPayload {
                    function_id: function_id(&self.address, action),
                    type_arguments: vec![token.clone()],
                    arguments: vec![amount.to_string(), rate.to_string()],
                })
            }
            _ => Err(EngineError::UnsupportedAction {
                protocol: self.name.clone(),
                action,
            }),
        }
    }
}
