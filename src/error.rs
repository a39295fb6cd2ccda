use crate::call::TxHash;

/// Failure taxonomy for every client operation.
///
/// `InvalidArgument` and `Precision` are raised locally, before anything is
/// submitted. `Network` means the outcome is unknown: the transaction may
/// still mine, so callers must re-query state instead of resubmitting.
/// `Reverted` means the ledger executed and rejected the call, so retrying
/// the same inputs will fail again.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("no wallet provider is available")]
    ProviderUnavailable,
    #[error("the user declined the request")]
    UserRejected,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("'{input}' has more than {max_decimals} fractional digits")]
    Precision { input: String, max_decimals: u32 },
    #[error("the provider refused the call: {0}")]
    Submission(String),
    #[error("transaction {tx_hash} reverted on the ledger")]
    Reverted { tx_hash: TxHash },
    #[error("network failure, outcome unknown: {0}")]
    Network(String),
    #[error("unrecognized ledger status code {code}")]
    UnrecognizedStatus { code: u8 },
}
