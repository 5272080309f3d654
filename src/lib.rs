pub mod config;
pub mod error;
pub mod metrics;
pub mod optimizer;
pub mod protocols;
pub mod registry;
pub mod submitter;
pub mod types;

pub use error::EngineError;
pub use metrics::{HttpMetricsSource, PoolMetricsSource, StaticMetricsSource};
pub use optimizer::{LiquidityOptimizer, NaiveSumValuation, ValuationService};
pub use protocols::{DexProtocol, LendingProtocol, ProtocolDescriptor};
pub use registry::{FirstRegistered, ProtocolRegistry, Route, RouteSelector};
pub use submitter::{DryRunSubmitter, TransactionSubmitter};
pub use types::{
    ActionParams, Allocation, AllocationPlan, CallPayload, PoolMetrics, ProtocolAction,
    ProtocolCategory, TokenPair, TransactionResult,
};
