//! Mapping between ledger status codes and domain lifecycle states
//!
//! Unknown codes surface as [`ClientError::UnrecognizedStatus`] instead of a
//! default mapping, so schema drift between client and contract fails loudly.
use crate::error::ClientError;
use crate::types::{InvoiceStatus, LcStatus};

pub fn invoice_status(code: u8) -> Result<InvoiceStatus, ClientError> {
    match code {
        0 => Ok(InvoiceStatus::Created),
        1 => Ok(InvoiceStatus::Approved),
        2 => Ok(InvoiceStatus::Paid),
        3 => Ok(InvoiceStatus::Rejected),
        4 => Ok(InvoiceStatus::Expired),
        code => Err(ClientError::UnrecognizedStatus { code }),
    }
}

pub fn lc_status(code: u8) -> Result<LcStatus, ClientError> {
    match code {
        0 => Ok(LcStatus::Created),
        1 => Ok(LcStatus::DocumentsSubmitted),
        2 => Ok(LcStatus::DocumentsApproved),
        3 => Ok(LcStatus::PaymentReleased),
        4 => Ok(LcStatus::DocumentsRejected),
        5 => Ok(LcStatus::Expired),
        code => Err(ClientError::UnrecognizedStatus { code }),
    }
}

impl InvoiceStatus {
    pub fn code(&self) -> u8 {
        match self {
            InvoiceStatus::Created => 0,
            InvoiceStatus::Approved => 1,
            InvoiceStatus::Paid => 2,
            InvoiceStatus::Rejected => 3,
            InvoiceStatus::Expired => 4,
        }
    }
}

impl LcStatus {
    pub fn code(&self) -> u8 {
        match self {
            LcStatus::Created => 0,
            LcStatus::DocumentsSubmitted => 1,
            LcStatus::DocumentsApproved => 2,
            LcStatus::PaymentReleased => 3,
            LcStatus::DocumentsRejected => 4,
            LcStatus::Expired => 5,
        }
    }
}
