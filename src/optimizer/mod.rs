use crate::error::EngineError;
use crate::metrics::PoolMetricsSource;
use crate::registry::ProtocolRegistry;
use crate::types::{
    ActionParams, Allocation, AllocationPlan, PoolMetrics, ProtocolAction, ProtocolCategory,
    TokenPair, TransactionResult,
};

use alloy::primitives::U256;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Base units per whole unit, used only to bring TVL and volume into a
/// float-friendly range for scoring.
const BASE_UNITS_PER_WHOLE: f64 = 1e8;

/// Maps a basket of token balances to a single total value. The default
/// sums balances across token symbols as if they were fungible; no price
/// normalization occurs. A price-oracle-backed conversion can replace it
/// without changing the allocation algorithm's shape.
pub trait ValuationService: Send + Sync {
    fn total_value(&self, balances: &HashMap<String, U256>) -> U256;
}

/// Cross-token summation, the reference behavior.
pub struct NaiveSumValuation;

impl ValuationService for NaiveSumValuation {
    fn total_value(&self, balances: &HashMap<String, U256>) -> U256 {
        balances.values().fold(U256::ZERO, |acc, v| acc + *v)
    }
}

/// Candidate pairs scanned per DEX when no deployment config overrides them.
pub fn default_candidate_pairs() -> Vec<TokenPair> {
    vec![
        TokenPair::new("APT", "USDC"),
        TokenPair::new("APT", "USDT"),
        TokenPair::new("USDC", "USDT"),
    ]
}

/// Scores candidate pools across all registered DEXes and splits available
/// capital proportionally to APY, then can drive the registry to execute
/// the plan as a sequence of add-liquidity actions.
pub struct LiquidityOptimizer {
    registry: Arc<ProtocolRegistry>,
    metrics: Arc<dyn PoolMetricsSource>,
    valuation: Box<dyn ValuationService>,
    candidate_pairs: Vec<TokenPair>,
}

impl LiquidityOptimizer {
    pub fn new(registry: Arc<ProtocolRegistry>, metrics: Arc<dyn PoolMetricsSource>) -> Self {
        Self {
            registry,
            metrics,
            valuation: Box::new(NaiveSumValuation),
            candidate_pairs: default_candidate_pairs(),
        }
    }

    pub fn with_candidate_pairs(mut self, pairs: Vec<TokenPair>) -> Self {
        if !pairs.is_empty() {
            self.candidate_pairs = pairs;
        }
        self
    }

    pub fn with_valuation(mut self, valuation: Box<dyn ValuationService>) -> Self {
        self.valuation = valuation;
        self
    }

    /// Pool ranking score. The APY term blends toward a flat baseline of 1
    /// as risk tolerance drops; TVL and volume always carry full weight.
    /// The flat `(1 - risk)` term is kept as-is for behavioral
    /// compatibility with the reference ranking.
    fn score(metrics: &PoolMetrics, risk_tolerance: f64) -> f64 {
        let tvl_whole = u256_to_f64(metrics.tvl) / BASE_UNITS_PER_WHOLE;
        let volume_whole = u256_to_f64(metrics.volume_24h) / BASE_UNITS_PER_WHOLE;
        (metrics.apy * risk_tolerance + (1.0 - risk_tolerance)) * tvl_whole * volume_whole
    }

    /// Compute a capital allocation plan across eligible pools.
    ///
    /// A pool is eligible when the caller holds a nonzero balance of both
    /// of its legs. Capital splits proportionally to APY; both legs of a
    /// pool get the same nominal amount. Fails with `NoEligiblePools` when
    /// nothing is eligible or every eligible pool has zero APY.
    pub async fn optimize(
        &self,
        available_tokens: &HashMap<String, U256>,
        risk_tolerance: f64,
    ) -> Result<AllocationPlan, EngineError> {
        let risk = risk_tolerance.clamp(0.0, 1.0);
        let dexes = self.registry.list_by_category(ProtocolCategory::Dex);

        let mut candidates: Vec<PoolMetrics> = Vec::new();
        for dex in &dexes {
            for pair in &self.candidate_pairs {
                let metrics = self
                    .metrics
                    .get_metrics(dex.name(), &pair.token_a, &pair.token_b)
                    .await
                    .map_err(|cause| EngineError::MetricsSource {
                        protocol: dex.name().to_string(),
                        cause,
                    })?;
                candidates.push(metrics);
            }
        }

        let has_balance = |token: &str| {
            available_tokens
                .get(token)
                .map(|b| !b.is_zero())
                .unwrap_or(false)
        };
        let mut eligible: Vec<PoolMetrics> = candidates
            .into_iter()
            .filter(|m| has_balance(&m.token_a) && has_balance(&m.token_b))
            .collect();

        if eligible.is_empty() {
            warn!("No eligible pools for the provided balances");
            return Err(EngineError::NoEligiblePools);
        }

        eligible.sort_by(|a, b| {
            Self::score(b, risk)
                .partial_cmp(&Self::score(a, risk))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // APY in integer basis points so the proportional split stays exact
        // for balances beyond f64 precision.
        let apy_bps: Vec<u64> = eligible
            .iter()
            .map(|m| (m.apy.max(0.0) * 100.0).round() as u64)
            .collect();
        let total_bps: u64 = apy_bps.iter().sum();
        if total_bps == 0 {
            warn!("All eligible pools report zero APY");
            return Err(EngineError::NoEligiblePools);
        }

        let total_value = self.valuation.total_value(available_tokens);
        let total_bps_u256 = U256::from(total_bps);

        let allocations: Vec<Allocation> = eligible
            .iter()
            .zip(apy_bps.iter())
            .map(|(m, bps)| {
                // Same nominal amount on both legs; a real two-asset balance
                // computation is out of scope.
                let amount = total_value * U256::from(*bps) / total_bps_u256;
                Allocation {
                    protocol: m.protocol.clone(),
                    token_a: m.token_a.clone(),
                    token_b: m.token_b.clone(),
                    amount_a: amount,
                    amount_b: amount,
                    expected_apy: m.apy,
                }
            })
            .collect();

        let total_expected_apy =
            allocations.iter().map(|a| a.expected_apy).sum::<f64>() / allocations.len() as f64;

        info!(
            "Allocation plan: {} pools, mean APY {:.2}%",
            allocations.len(),
            total_expected_apy
        );

        Ok(AllocationPlan {
            allocations,
            total_expected_apy,
        })
    }

    /// Execute a plan as sequential add-liquidity actions, in plan order.
    /// Stops at the first failure and propagates it; already-submitted
    /// allocations are final on-chain, so there is no rollback.
    pub async fn execute_strategy(
        &self,
        plan: &AllocationPlan,
    ) -> Result<Vec<TransactionResult>, EngineError> {
        let mut results = Vec::with_capacity(plan.allocations.len());
        for allocation in &plan.allocations {
            let params = ActionParams::Liquidity {
                token_a: allocation.token_a.clone(),
                token_b: allocation.token_b.clone(),
                amount_a: allocation.amount_a,
                amount_b: allocation.amount_b,
                min_lp_tokens: None,
            };
            let result = self
                .registry
                .execute_action(&allocation.protocol, ProtocolAction::AddLiquidity, &params)
                .await?;
            results.push(result);
        }
        Ok(results)
    }
}

fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(0.0)
}
