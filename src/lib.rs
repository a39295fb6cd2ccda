//! Async client for a fixed trade-finance contract on an external ledger.
//!
//! The [`gateway::ContractGateway`] is the entry point: one operation per
//! contract primitive, each lazily connecting through the
//! [`connector::ProviderConnector`], encoding amounts with [`amount`],
//! submitting through the [`lifecycle::TxLifecycle`], and reporting the
//! outcome to a [`notify::Notifier`]. Status codes reported by the ledger
//! are mapped in [`status`]. [`in_memory::InMemoryLedger`] is a scriptable
//! fake provider for tests and demos.

pub mod address;
pub mod amount;
pub mod call;
pub mod connector;
pub mod error;
pub mod gateway;
pub mod in_memory;
pub mod lifecycle;
pub mod notify;
pub mod provider;
pub mod status;
pub mod types;
pub mod utils;
