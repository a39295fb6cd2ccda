//! The seam between this client and the externally supplied wallet/provider
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::address::Address;
use crate::amount::MinorUnits;
use crate::call::{CallData, TxHash};
use crate::error::ClientError;

/// A call ready for submission. `from` is the address captured when the
/// operation started; `value` is transferred atomically with the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedCall {
    pub from: Address,
    pub value: MinorUnits,
    pub call: CallData,
}

/// The ledger's confirmation record for a submitted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub success: bool,
}

/// Contract the injected wallet/provider must fulfil.
///
/// The connector and gateway are written against this trait only, so a fake
/// provider drives the whole client in tests. Account-change notifications
/// arrive over a channel rather than a registered callback, which keeps
/// ordering and shutdown explicit.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Prompt the user for account access; resolves to the account list.
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError>;

    /// Read-only view of the current account list, no prompt.
    async fn accounts(&self) -> Vec<Address>;

    /// Prompt for signing, then submit. A hash is returned once the provider
    /// has accepted the call; mining happens later.
    async fn submit_call(&self, call: SubmittedCall) -> Result<TxHash, ClientError>;

    /// Resolve once the ledger reports a receipt for `tx_hash`.
    async fn wait_receipt(&self, tx_hash: &TxHash) -> Result<Receipt, ClientError>;

    /// Free read-only contract query; no signing, no state change.
    async fn read_call(&self, call: CallData) -> Result<Vec<u8>, ClientError>;

    /// Stream of account-list-changed events.
    fn subscribe_accounts(&self) -> mpsc::UnboundedReceiver<Vec<Address>>;
}
