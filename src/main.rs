use alloy::primitives::U256;
use defi_liquidity_engine::config;
use defi_liquidity_engine::optimizer::{default_candidate_pairs, LiquidityOptimizer};
use defi_liquidity_engine::{DryRunSubmitter, PoolMetrics, StaticMetricsSource};
use dotenvy::dotenv;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn config_path(env_key: &str, default: &str) -> std::path::PathBuf {
    std::env::var(env_key)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap().join(default))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    dotenv().ok();

    info!("Initializing DeFi liquidity engine (dry run)...");

    let deployment_path = config_path("DEPLOYMENT_JSON", "deployment.json");
    let (protocols, pairs) = config::load_deployment_file(deployment_path.to_str().unwrap())?;

    let submitter = Arc::new(DryRunSubmitter::new());
    let registry = Arc::new(config::build_registry(&protocols, submitter));

    let candidate_pairs = if pairs.is_empty() {
        default_candidate_pairs()
    } else {
        pairs
    };

    // Offline demo: static metrics for every (DEX, pair) candidate.
    let mut metrics = StaticMetricsSource::new();
    for dex in registry.list_by_category(defi_liquidity_engine::ProtocolCategory::Dex) {
        for (i, pair) in candidate_pairs.iter().enumerate() {
            metrics = metrics.with_pool(PoolMetrics {
                protocol: dex.name().to_string(),
                token_a: pair.token_a.clone(),
                token_b: pair.token_b.clone(),
                apy: 8.0 + 2.0 * i as f64,
                tvl: U256::from(5_000_000_00000000u64),
                volume_24h: U256::from(250_000_00000000u64),
            });
        }
    }

    let optimizer = LiquidityOptimizer::new(Arc::clone(&registry), Arc::new(metrics))
        .with_candidate_pairs(candidate_pairs);

    let mut balances: HashMap<String, U256> = HashMap::new();
    balances.insert("APT".to_string(), U256::from(1_000_00000000u64));
    balances.insert("USDC".to_string(), U256::from(5_000_000000u64));
    balances.insert("USDT".to_string(), U256::from(5_000_000000u64));

    let plan = optimizer.optimize(&balances, 0.7).await?;
    info!(
        "Plan: {} allocations, mean APY {:.2}%",
        plan.allocations.len(),
        plan.total_expected_apy
    );
    for allocation in &plan.allocations {
        info!(
            "  {} {}/{}: {} + {} (APY {:.2}%)",
            allocation.protocol,
            allocation.token_a,
            allocation.token_b,
            allocation.amount_a,
            allocation.amount_b,
            allocation.expected_apy
        );
    }

    let results = optimizer.execute_strategy(&plan).await?;
    info!("Executed {} add-liquidity actions", results.len());

    Ok(())
}
