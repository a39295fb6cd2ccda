//! Domain entities mirrored from the trade-finance contract
//!
//! The ledger is the sole authority over these lifecycles; the client only
//! requests transitions and reports the ledger's verdict. All ids are
//! caller-assigned strings, never generated here.
use chrono::{DateTime, TimeZone, Utc};

use crate::address::Address;
use crate::amount::MinorUnits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    Created,
    Approved,
    Paid,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcStatus {
    Created,
    DocumentsSubmitted,
    DocumentsApproved,
    PaymentReleased,
    DocumentsRejected,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: String,
    pub amount: MinorUnits,
    pub exporter: Address,
    pub importer: Address,
    pub due_date: TimeStamp<Utc>,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterOfCredit {
    pub id: String,
    pub importer: Address,
    pub exporter: Address,
    pub amount: MinorUnits,
    pub terms: String,
    pub status: LcStatus,
    pub reject_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyChainFinancing {
    pub id: String,
    pub supplier: Address,
    pub buyer: Address,
    pub amount: MinorUnits,
    pub interest_rate_bps: u32,
    pub duration_periods: u32,
    pub is_approved: bool,
    pub is_repaid: bool,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn now() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(TimeStamp)
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}
