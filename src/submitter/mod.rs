use crate::types::{CallPayload, TransactionResult};

use async_trait::async_trait;
use eyre::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Signs and submits a built payload to a chain node. Injected into the
/// registry, never owned by it. Submissions are network round-trips: slow,
/// fallible, and not atomic across calls. The engine never retries a failed
/// submission because on-chain actions may not be idempotent.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, payload: &CallPayload) -> Result<TransactionResult>;
}

/// Submitter that logs payloads instead of touching a chain. Useful for
/// demos and tests; hashes are deterministic per-instance counters.
pub struct DryRunSubmitter {
    counter: AtomicU64,
}

impl DryRunSubmitter {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for DryRunSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionSubmitter for DryRunSubmitter {
    async fn submit(&self, payload: &CallPayload) -> Result<TransactionResult> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        info!(
            "Dry-run submit: {} typeArgs={:?} args={:?}",
            payload.function_id, payload.type_arguments, payload.arguments
        );
        Ok(TransactionResult {
            hash: format!("0xdry{:08x}", n),
            success: true,
            submitted_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every payload it sees; fails the nth call if told to.
    pub(crate) struct RecordingSubmitter {
        pub calls: Mutex<Vec<CallPayload>>,
        pub fail_on_call: Option<usize>,
    }

    impl RecordingSubmitter {
        pub fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: None,
            }
        }

        pub fn failing_on(call_index: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: Some(call_index),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TransactionSubmitter for RecordingSubmitter {
        async fn submit(&self, payload: &CallPayload) -> Result<TransactionResult> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(payload.clone());
                calls.len() - 1
            };
            if self.fail_on_call == Some(index) {
                return Err(eyre::eyre!("node rejected transaction"));
            }
            Ok(TransactionResult {
                hash: format!("0x{:04x}", index),
                success: true,
                submitted_at: chrono::Utc::now().to_rfc3339(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_hashes_are_distinct() {
        let submitter = DryRunSubmitter::new();
        let payload = CallPayload {
            function_id: "0xAA::scripts::swap".to_string(),
            type_arguments: vec![],
            arguments: vec![],
        };
        let a = submitter.submit(&payload).await.unwrap();
        let b = submitter.submit(&payload).await.unwrap();
        assert!(a.success && b.success);
        assert_ne!(a.hash, b.hash);
    }
}
