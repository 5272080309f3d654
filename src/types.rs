use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProtocolCategory {
    #[serde(rename = "dex")]
    Dex,
    #[serde(rename = "lending")]
    Lending,
    #[serde(rename = "yield")]
    Yield,
}

impl std::fmt::Display for ProtocolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolCategory::Dex => write!(f, "dex"),
            ProtocolCategory::Lending => write!(f, "lending"),
            ProtocolCategory::Yield => write!(f, "yield"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProtocolAction {
    Swap,
    AddLiquidity,
    RemoveLiquidity,
    Supply,
    Borrow,
    Repay,
    Stake,
    Unstake,
}

impl ProtocolAction {
    /// On-chain entry function name embedded in the payload's function id.
    pub fn entry_function(&self) -> &'static str {
        match self {
            ProtocolAction::Swap => "swap",
            ProtocolAction::AddLiquidity => "add_liquidity",
            ProtocolAction::RemoveLiquidity => "remove_liquidity",
            ProtocolAction::Supply => "supply",
            ProtocolAction::Borrow => "borrow",
            ProtocolAction::Repay => "repay",
            ProtocolAction::Stake => "stake",
            ProtocolAction::Unstake => "unstake",
        }
    }
}

impl std::fmt::Display for ProtocolAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.entry_function())
    }
}

/// Parameters for one protocol action, tagged by action family.
/// All amounts are unsigned integers in base (smallest) units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionParams {
    Swap {
        token_in: String,
        token_out: String,
        amount_in: U256,
        min_amount_out: U256,
    },
    Liquidity {
        token_a: String,
        token_b: String,
        amount_a: U256,
        amount_b: U256,
        min_lp_tokens: Option<U256>,
    },
    Lending {
        token: String,
        amount: U256,
        interest_rate: Option<f64>,
    },
}

/// A chain call ready for signing and submission. Numeric arguments are
/// decimal strings of the underlying base-unit integers so precision
/// survives the payload boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallPayload {
    #[serde(rename = "functionId")]
    pub function_id: String,
    #[serde(rename = "typeArguments")]
    pub type_arguments: Vec<String>,
    pub arguments: Vec<String>,
}

/// A candidate pool pair for the optimizer, e.g. APT/USDC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TokenPair {
    pub token_a: String,
    pub token_b: String,
}

impl TokenPair {
    pub fn new(token_a: impl Into<String>, token_b: impl Into<String>) -> Self {
        Self {
            token_a: token_a.into(),
            token_b: token_b.into(),
        }
    }
}

/// Snapshot of one pool's yield and liquidity figures. Queried fresh on
/// every optimization pass; never cached by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolMetrics {
    pub protocol: String,
    pub token_a: String,
    pub token_b: String,
    /// Annualized percentage yield, percent.
    pub apy: f64,
    /// Total value locked, base units.
    pub tvl: U256,
    /// 24h traded volume, base units.
    pub volume_24h: U256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub protocol: String,
    pub token_a: String,
    pub token_b: String,
    pub amount_a: U256,
    pub amount_b: U256,
    pub expected_apy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub allocations: Vec<Allocation>,
    /// Unweighted arithmetic mean of per-allocation APY. Note this is
    /// equal-weighted by pool count even though capital is allocated
    /// proportionally to APY.
    #[serde(rename = "totalExpectedApy")]
    pub total_expected_apy: f64,
}

/// Confirmed transaction record returned by the submission layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    pub hash: String,
    pub success: bool,
    pub submitted_at: String,
}
