use crate::types::{ProtocolAction, ProtocolCategory};

/// Everything a core operation can fail with. No variant is retried
/// internally: configuration and policy errors are pointless to retry with
/// unchanged input, and chain submissions may not be idempotent.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("protocol '{protocol}' does not support action '{action}'")]
    UnsupportedAction {
        protocol: String,
        action: ProtocolAction,
    },

    #[error("action '{action}' requires {expected} parameters")]
    InvalidParams {
        action: ProtocolAction,
        expected: &'static str,
    },

    #[error("protocol '{0}' is not registered")]
    ProtocolNotFound(String),

    #[error("no {0} protocol registered")]
    NoProtocolAvailable(ProtocolCategory),

    #[error("no eligible pools for the available token balances")]
    NoEligiblePools,

    #[error("metrics fetch failed for protocol '{protocol}': {cause}")]
    MetricsSource {
        protocol: String,
        cause: eyre::Report,
    },

    #[error("submission failed for protocol '{protocol}' action '{action}': {cause}")]
    Submission {
        protocol: String,
        action: ProtocolAction,
        cause: eyre::Report,
    },
}
