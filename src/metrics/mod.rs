use crate::types::PoolMetrics;

use alloy::primitives::U256;
use async_trait::async_trait;
use eyre::Result;
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::error;

/// Source of fresh pool metrics for the optimizer. Implementations are
/// network-bound and fallible; a timeout is an ordinary failure and is
/// propagated, never retried here.
#[async_trait]
pub trait PoolMetricsSource: Send + Sync {
    async fn get_metrics(&self, protocol: &str, token_a: &str, token_b: &str)
        -> Result<PoolMetrics>;
}

/// Fetches pool metrics from a stats endpoint over HTTP.
///
/// Expects responses of the form
/// `{ "data": { "pool": { "apy": 12.5, "tvl": "...", "volume24h": "..." } } }`
/// with `tvl` and `volume24h` as decimal strings of base-unit integers.
pub struct HttpMetricsSource {
    client: Client,
    endpoint: String,
}

impl HttpMetricsSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl PoolMetricsSource for HttpMetricsSource {
    async fn get_metrics(
        &self,
        protocol: &str,
        token_a: &str,
        token_b: &str,
    ) -> Result<PoolMetrics> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "protocol": protocol,
                "tokenA": token_a,
                "tokenB": token_b,
            }))
            .send()
            .await?;

        let data: serde_json::Value = response.json().await?;

        if let Some(errors) = data.get("errors") {
            error!("Stats endpoint errors for {}: {:?}", protocol, errors);
            return Err(eyre::eyre!("stats endpoint returned errors: {errors}"));
        }

        let pool = data
            .get("data")
            .and_then(|d| d.get("pool"))
            .ok_or_else(|| eyre::eyre!("no pool data for {protocol} {token_a}/{token_b}"))?;

        let apy = pool.get("apy").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let tvl = pool
            .get("tvl")
            .and_then(|v| v.as_str())
            .and_then(|v| v.parse::<U256>().ok())
            .unwrap_or(U256::ZERO);
        let volume_24h = pool
            .get("volume24h")
            .and_then(|v| v.as_str())
            .and_then(|v| v.parse::<U256>().ok())
            .unwrap_or(U256::ZERO);

        Ok(PoolMetrics {
            protocol: protocol.to_string(),
            token_a: token_a.to_string(),
            token_b: token_b.to_string(),
            apy,
            tvl,
            volume_24h,
        })
    }
}

/// In-memory metrics keyed by (protocol, tokenA, tokenB). For tests and
/// offline demos.
pub struct StaticMetricsSource {
    pools: HashMap<(String, String, String), PoolMetrics>,
}

impl StaticMetricsSource {
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }

    pub fn with_pool(mut self, metrics: PoolMetrics) -> Self {
        self.pools.insert(
            (
                metrics.protocol.clone(),
                metrics.token_a.clone(),
                metrics.token_b.clone(),
            ),
            metrics,
        );
        self
    }
}

impl Default for StaticMetricsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoolMetricsSource for StaticMetricsSource {
    async fn get_metrics(
        &self,
        protocol: &str,
        token_a: &str,
        token_b: &str,
    ) -> Result<PoolMetrics> {
        self.pools
            .get(&(
                protocol.to_string(),
                token_a.to_string(),
                token_b.to_string(),
            ))
            .cloned()
            .ok_or_else(|| eyre::eyre!("no metrics for {protocol} {token_a}/{token_b}"))
    }
}
