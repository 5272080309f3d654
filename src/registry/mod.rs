use crate::error::EngineError;
use crate::protocols::ProtocolDescriptor;
use crate::submitter::TransactionSubmitter;
use crate::types::{ActionParams, ProtocolAction, ProtocolCategory, TransactionResult};

use alloy::primitives::U256;
use std::sync::Arc;
use tracing::{info, warn};

/// Policy for choosing one descriptor out of a candidate list. The default
/// is `FirstRegistered`; a real price/rate comparison can be slotted in
/// without touching the registry's routing.
pub trait RouteSelector: Send + Sync {
    fn pick<'a>(
        &self,
        candidates: &'a [Arc<dyn ProtocolDescriptor>],
    ) -> Option<&'a Arc<dyn ProtocolDescriptor>>;
}

/// Picks the first candidate in registration order.
pub struct FirstRegistered;

impl RouteSelector for FirstRegistered {
    fn pick<'a>(
        &self,
        candidates: &'a [Arc<dyn ProtocolDescriptor>],
    ) -> Option<&'a Arc<dyn ProtocolDescriptor>> {
        candidates.first()
    }
}

/// A resolved route: which protocol to call and with what parameters.
#[derive(Debug, Clone)]
pub struct Route {
    pub protocol: String,
    pub params: ActionParams,
}

// Placeholder swap policy tolerates a fixed 5% shortfall on output.
const SLIPPAGE_NUMERATOR: u64 = 95;
const SLIPPAGE_DENOMINATOR: u64 = 100;

/// Owns the set of protocol descriptors, routes action requests to the
/// right one, and hands built payloads to the injected submitter.
///
/// Descriptors are registered at construction time. The registry is
/// read-only afterward; `register` is not safe to call concurrently with
/// readers and is restricted to setup by contract.
pub struct ProtocolRegistry {
    descriptors: Vec<Arc<dyn ProtocolDescriptor>>,
    submitter: Arc<dyn TransactionSubmitter>,
    selector: Box<dyn RouteSelector>,
}

impl ProtocolRegistry {
    pub fn new(submitter: Arc<dyn TransactionSubmitter>) -> Self {
        Self::with_selector(submitter, Box::new(FirstRegistered))
    }

    pub fn with_selector(
        submitter: Arc<dyn TransactionSubmitter>,
        selector: Box<dyn RouteSelector>,
    ) -> Self {
        Self {
            descriptors: Vec::new(),
            submitter,
            selector,
        }
    }

    /// Insert a descriptor, keyed by name. Re-registering a name replaces
    /// the old descriptor in place (last write wins), keeping its position
    /// in registration order.
    pub fn register(&mut self, descriptor: Arc<dyn ProtocolDescriptor>) {
        if let Some(existing) = self
            .descriptors
            .iter_mut()
            .find(|d| d.name() == descriptor.name())
        {
            warn!(
                "Protocol '{}' already registered; replacing with address {}",
                descriptor.name(),
                descriptor.address()
            );
            *existing = descriptor;
        } else {
            info!(
                "Registered {} protocol '{}' at {}",
                descriptor.category(),
                descriptor.name(),
                descriptor.address()
            );
            self.descriptors.push(descriptor);
        }
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn ProtocolDescriptor>> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    /// Build the payload for `(action, params)` on the named protocol and
    /// submit it. The submitter is never called for an unknown protocol or
    /// an invalid request.
    pub async fn execute_action(
        &self,
        protocol_name: &str,
        action: ProtocolAction,
        params: &ActionParams,
    ) -> Result<TransactionResult, EngineError> {
        let descriptor = self
            .find(protocol_name)
            .ok_or_else(|| EngineError::ProtocolNotFound(protocol_name.to_string()))?;

        let payload = descriptor.build_payload(action, params)?;
        info!(
            "Submitting {} on '{}': {}",
            action, protocol_name, payload.function_id
        );

        let result = self
            .submitter
            .submit(&payload)
            .await
            .map_err(|cause| EngineError::Submission {
                protocol: protocol_name.to_string(),
                action,
                cause,
            })?;
        info!("Confirmed {} on '{}': {}", action, protocol_name, result.hash);
        Ok(result)
    }

    /// All registered descriptors of one category, in registration order.
    pub fn list_by_category(&self, category: ProtocolCategory) -> Vec<Arc<dyn ProtocolDescriptor>> {
        self.descriptors
            .iter()
            .filter(|d| d.category() == category)
            .cloned()
            .collect()
    }

    /// Choose a DEX for a swap and fill in parameters with a fixed 5%
    /// slippage tolerance: `min_amount_out = amount_in * 95 / 100`, floored.
    pub fn select_swap_route(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: U256,
    ) -> Result<Route, EngineError> {
        let candidates = self.list_by_category(ProtocolCategory::Dex);
        let dex = self
            .selector
            .pick(&candidates)
            .ok_or(EngineError::NoProtocolAvailable(ProtocolCategory::Dex))?;

        let min_amount_out =
            amount_in * U256::from(SLIPPAGE_NUMERATOR) / U256::from(SLIPPAGE_DENOMINATOR);
        Ok(Route {
            protocol: dex.name().to_string(),
            params: ActionParams::Swap {
                token_in: token_in.to_string(),
                token_out: token_out.to_string(),
                amount_in,
                min_amount_out,
            },
        })
    }

    /// Choose a lending market for a supply/borrow. The interest rate is
    /// left unset; it resolves to 0 at the payload boundary.
    pub fn select_lending_protocol(
        &self,
        token: &str,
        amount: U256,
    ) -> Result<Route, EngineError> {
        let candidates = self.list_by_category(ProtocolCategory::Lending);
        let market = self
            .selector
            .pick(&candidates)
            .ok_or(EngineError::NoProtocolAvailable(ProtocolCategory::Lending))?;

        Ok(Route {
            protocol: market.name().to_string(),
            params: ActionParams::Lending {
                token: token.to_string(),
                amount,
                interest_rate: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::{DexProtocol, LendingProtocol};
    use crate::submitter::testing::RecordingSubmitter;

    fn registry_with(submitter: Arc<RecordingSubmitter>) -> ProtocolRegistry {
        let mut registry = ProtocolRegistry::new(submitter);
        registry.register(Arc::new(DexProtocol::new("Alpha", "0xAA")));
        registry.register(Arc::new(LendingProtocol::new("Beta", "0xBB")));
        registry
    }

    #[tokio::test]
    async fn unknown_protocol_never_reaches_submitter() {
        let submitter = Arc::new(RecordingSubmitter::new());
        let registry = registry_with(Arc::clone(&submitter));
        let params = ActionParams::Swap {
            token_in: "APT".to_string(),
            token_out: "USDC".to_string(),
            amount_in: U256::from(1000u64),
            min_amount_out: U256::from(950u64),
        };
        let err = registry
            .execute_action("Gamma", ProtocolAction::Swap, &params)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ProtocolNotFound(name) if name == "Gamma"));
        assert_eq!(submitter.call_count(), 0);
    }

    #[tokio::test]
    async fn swap_end_to_end_payload() {
        let submitter = Arc::new(RecordingSubmitter::new());
        let registry = registry_with(Arc::clone(&submitter));
        let params = ActionParams::Swap {
            token_in: "APT".to_string(),
            token_out: "USDC".to_string(),
            amount_in: U256::from(1000u64),
            min_amount_out: U256::from(950u64),
        };
        let result = registry
            .execute_action("Alpha", ProtocolAction::Swap, &params)
            .await
            .unwrap();
        assert!(result.success);

        let calls = submitter.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function_id, "0xAA::scripts::swap");
        assert_eq!(calls[0].arguments, vec!["1000", "950"]);
    }

    #[tokio::test]
    async fn submission_failure_carries_context() {
        let submitter = Arc::new(RecordingSubmitter::failing_on(0));
        let registry = registry_with(submitter);
        let params = ActionParams::Lending {
            token: "USDC".to_string(),
            amount: U256::from(100u64),
            interest_rate: None,
        };
        let err = registry
            .execute_action("Beta", ProtocolAction::Supply, &params)
            .await
            .unwrap_err();
        match err {
            EngineError::Submission {
                protocol, action, ..
            } => {
                assert_eq!(protocol, "Beta");
                assert_eq!(action, ProtocolAction::Supply);
            }
            other => panic!("expected Submission error, got {other:?}"),
        }
    }

    #[test]
    fn swap_route_applies_five_percent_slippage() {
        let registry = registry_with(Arc::new(RecordingSubmitter::new()));
        let route = registry
            .select_swap_route("APT", "USDC", U256::from(1001u64))
            .unwrap();
        assert_eq!(route.protocol, "Alpha");
        let ActionParams::Swap { min_amount_out, .. } = route.params else {
            panic!("expected swap params");
        };
        // floor(1001 * 95 / 100) = 950
        assert_eq!(min_amount_out, U256::from(950u64));
    }

    #[test]
    fn swap_route_without_dex_fails() {
        let mut registry = ProtocolRegistry::new(Arc::new(RecordingSubmitter::new()));
        registry.register(Arc::new(LendingProtocol::new("Beta", "0xBB")));
        let err = registry
            .select_swap_route("APT", "USDC", U256::from(100u64))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::NoProtocolAvailable(ProtocolCategory::Dex)
        ));
    }

    #[test]
    fn lending_route_picks_first_registered_market() {
        let mut registry = ProtocolRegistry::new(Arc::new(RecordingSubmitter::new()));
        registry.register(Arc::new(LendingProtocol::new("Beta", "0xBB")));
        registry.register(Arc::new(LendingProtocol::new("Delta", "0xDD")));
        let route = registry
            .select_lending_protocol("USDC", U256::from(100u64))
            .unwrap();
        assert_eq!(route.protocol, "Beta");
    }

    #[test]
    fn list_by_category_preserves_registration_order() {
        let mut registry = ProtocolRegistry::new(Arc::new(RecordingSubmitter::new()));
        registry.register(Arc::new(DexProtocol::new("Alpha", "0xAA")));
        registry.register(Arc::new(LendingProtocol::new("Beta", "0xBB")));
        registry.register(Arc::new(DexProtocol::new("Gamma", "0xCC")));
        let dexes = registry.list_by_category(ProtocolCategory::Dex);
        let names: Vec<&str> = dexes.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn reregistration_replaces_in_place() {
        let mut registry = ProtocolRegistry::new(Arc::new(RecordingSubmitter::new()));
        registry.register(Arc::new(DexProtocol::new("Alpha", "0xAA")));
        registry.register(Arc::new(DexProtocol::new("Gamma", "0xCC")));
        registry.register(Arc::new(DexProtocol::new("Alpha", "0xA2")));
        let dexes = registry.list_by_category(ProtocolCategory::Dex);
        assert_eq!(dexes.len(), 2);
        assert_eq!(dexes[0].name(), "Alpha");
        assert_eq!(dexes[0].address(), "0xA2");
        assert_eq!(dexes[1].name(), "Gamma");
    }
}
