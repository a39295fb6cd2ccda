//! Two-phase transaction lifecycle: submit, then await the receipt
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::address::Address;
use crate::call::TxHash;
use crate::error::ClientError;
use crate::provider::{Provider, Receipt, SubmittedCall};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long to wait for a receipt before reporting the outcome unknown.
    pub receipt_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            receipt_timeout: Duration::from_secs(60),
        }
    }
}

/// A call the provider has accepted but the ledger has not yet mined.
///
/// `from` is the address captured at submission time; an account switch while
/// the call is in flight does not affect it. Dropping the handle abandons the
/// local wait only, never the ledger-side transaction.
#[derive(Debug)]
pub struct PendingHandle {
    pub tx_hash: TxHash,
    pub from: Address,
}

pub struct TxLifecycle {
    provider: Arc<dyn Provider>,
    config: ClientConfig,
}

impl TxLifecycle {
    pub fn new(provider: Arc<dyn Provider>, config: ClientConfig) -> Self {
        Self { provider, config }
    }

    /// Send the call through the provider's signing prompt.
    ///
    /// A failure here (`UserRejected`, `Submission`) means nothing reached
    /// the ledger; the state machine never entered `Pending`.
    pub async fn submit(&self, call: SubmittedCall) -> Result<PendingHandle, ClientError> {
        let from = call.from;
        debug!(function = ?call.call.function, %from, "submitting call");

        let tx_hash = self.provider.submit_call(call).await?;
        debug!(%tx_hash, "call accepted by provider");
        Ok(PendingHandle { tx_hash, from })
    }

    /// Suspend until the ledger reports a receipt.
    ///
    /// A timeout yields [`ClientError::Network`]: the outcome is unknown and
    /// the caller must re-query status, never resubmit. No retry is ever
    /// attempted here; after `Reverted` or `Network` that is a caller
    /// decision.
    pub async fn await_mined(&self, pending: PendingHandle) -> Result<Receipt, ClientError> {
        let wait = self.provider.wait_receipt(&pending.tx_hash);
        match tokio::time::timeout(self.config.receipt_timeout, wait).await {
            Err(_) => {
                warn!(tx_hash = %pending.tx_hash, "no receipt within timeout");
                Err(ClientError::Network(format!(
                    "no receipt for {} within {:?}",
                    pending.tx_hash, self.config.receipt_timeout
                )))
            }
            Ok(Err(e)) => Err(e),
            Ok(Ok(receipt)) if receipt.success => {
                debug!(tx_hash = %receipt.tx_hash, "mined successfully");
                Ok(receipt)
            }
            Ok(Ok(receipt)) => {
                warn!(tx_hash = %receipt.tx_hash, "execution reverted");
                Err(ClientError::Reverted {
                    tx_hash: receipt.tx_hash,
                })
            }
        }
    }
}
