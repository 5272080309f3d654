use crate::protocols::{DexProtocol, LendingProtocol, ProtocolDescriptor};
use crate::registry::ProtocolRegistry;
use crate::submitter::TransactionSubmitter;
use crate::types::{ProtocolCategory, TokenPair};

use eyre::Result;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tracing::warn;

/// Format of each protocol entry in deployment.json (camelCase).
#[derive(serde::Deserialize)]
struct ProtocolEntry {
    name: String,
    address: String,
    category: ProtocolCategory,
    enabled: bool,
}

/// Format of the optimizer section in deployment.json.
#[derive(serde::Deserialize, Default)]
struct OptimizerEntry {
    #[serde(rename = "candidatePairs", default)]
    candidate_pairs: Vec<(String, String)>,
}

/// Root format of deployment.json:
/// { "protocols": { "id": {...} }, "optimizer": { "candidatePairs": [...] } }
#[derive(serde::Deserialize)]
struct DeploymentFile {
    protocols: HashMap<String, ProtocolEntry>,
    #[serde(default)]
    optimizer: OptimizerEntry,
}

#[derive(Debug, Clone)]
pub struct ProtocolEntryConfig {
    pub id: String,
    pub name: String,
    pub address: String,
    pub category: ProtocolCategory,
}

/// Load deployment.json. Returns only enabled protocols, sorted by id so
/// registration order is deterministic, plus the optimizer's candidate
/// pairs (empty when the section is absent; callers fall back to the
/// default set).
pub fn load_deployment_file(path: &str) -> Result<(Vec<ProtocolEntryConfig>, Vec<TokenPair>)> {
    let content = fs::read_to_string(path)?;
    let file: DeploymentFile = serde_json::from_str(&content)?;

    let mut protocols: Vec<ProtocolEntryConfig> = file
        .protocols
        .into_iter()
        .filter(|(_, entry)| entry.enabled)
        .map(|(id, entry)| ProtocolEntryConfig {
            id,
            name: entry.name,
            address: entry.address,
            category: entry.category,
        })
        .collect();
    protocols.sort_by(|a, b| a.id.cmp(&b.id));

    let pairs = file
        .optimizer
        .candidate_pairs
        .into_iter()
        .map(|(a, b)| TokenPair::new(a, b))
        .collect();

    Ok((protocols, pairs))
}

/// Build a registry from deployment entries. Entries whose category has no
/// descriptor implementation are skipped.
pub fn build_registry(
    entries: &[ProtocolEntryConfig],
    submitter: Arc<dyn TransactionSubmitter>,
) -> ProtocolRegistry {
    let mut registry = ProtocolRegistry::new(submitter);
    for entry in entries {
        let descriptor: Arc<dyn ProtocolDescriptor> = match entry.category {
            ProtocolCategory::Dex => Arc::new(DexProtocol::new(&entry.name, &entry.address)),
            ProtocolCategory::Lending => {
                Arc::new(LendingProtocol::new(&entry.name, &entry.address))
            }
            ProtocolCategory::Yield => {
                warn!(
                    "Skipping '{}': no descriptor for the yield category yet",
                    entry.name
                );
                continue;
            }
        };
        registry.register(descriptor);
    }
    registry
}
