//! End-to-end scenarios against the in-memory ledger
//!
//! Each test drives the real gateway/connector/lifecycle stack over an
//! [`InMemoryLedger`], scripting the ledger's failure modes where a scenario
//! needs them.
#![allow(unused_imports)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use trade_ledger_client::{
    address::Address,
    amount::Currency,
    connector::{Connection, ConnectionEvent, ProviderConnector},
    error::ClientError,
    gateway::ContractGateway,
    in_memory::InMemoryLedger,
    lifecycle::ClientConfig,
    notify::{ChannelNotifier, Notice, NullNotifier},
    provider::Provider,
    types::{InvoiceStatus, LcStatus, TimeStamp},
    utils::new_reference_id,
};

fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 20])
}

fn due_next_month() -> TimeStamp<Utc> {
    TimeStamp::from(Utc::now() + chrono::Duration::days(30))
}

/// Gateway over a fresh in-memory ledger holding one unlocked account,
/// with a channel notifier so tests can inspect what the UI would see.
fn setup() -> (
    Arc<InMemoryLedger>,
    ContractGateway,
    tokio::sync::mpsc::UnboundedReceiver<Notice>,
) {
    let ledger = Arc::new(InMemoryLedger::new(vec![addr(1), addr(2)]));
    let (notifier, notices) = ChannelNotifier::new();
    let gateway = ContractGateway::new(
        ledger.clone() as Arc<dyn Provider>,
        Arc::new(notifier),
        ClientConfig::default(),
    );
    (ledger, gateway, notices)
}

// CONNECTOR SCENARIOS

#[tokio::test]
async fn connect_caches_the_first_reported_account() -> anyhow::Result<()> {
    let ledger = Arc::new(InMemoryLedger::new(vec![addr(7), addr(8)]));
    let connector = ProviderConnector::new(ledger as Arc<dyn Provider>);

    assert_eq!(connector.current_address(), None);

    let connection = connector.connect().await?;
    assert!(connection.is_connected);
    assert_eq!(connection.active_address, Some(addr(7)));
    // Cached read, no further round trip.
    assert_eq!(connector.current_address(), Some(addr(7)));

    Ok(())
}

#[tokio::test]
async fn connect_surfaces_provider_unavailability_and_rejection() {
    let ledger = Arc::new(InMemoryLedger::new(vec![addr(1)]));
    let connector = ProviderConnector::new(ledger.clone() as Arc<dyn Provider>);

    ledger.set_unavailable(true);
    assert!(matches!(
        connector.connect().await,
        Err(ClientError::ProviderUnavailable)
    ));

    ledger.set_unavailable(false);
    ledger.set_reject_prompt(true);
    assert!(matches!(
        connector.connect().await,
        Err(ClientError::UserRejected)
    ));

    // Neither failure left a phantom connection behind.
    assert_eq!(connector.current_address(), None);
}

#[tokio::test]
async fn empty_account_list_disconnects() -> anyhow::Result<()> {
    let ledger = Arc::new(InMemoryLedger::new(vec![addr(1)]));
    let connector = ProviderConnector::new(ledger.clone() as Arc<dyn Provider>);
    connector.connect().await?;
    let mut events = connector.events();

    ledger.change_accounts(vec![]);

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv()).await??;
    assert_eq!(event, ConnectionEvent::Disconnected);
    assert_eq!(connector.current_address(), None);
    assert!(!connector.connection().is_connected);

    Ok(())
}

#[tokio::test]
async fn redundant_account_notifications_are_idempotent() -> anyhow::Result<()> {
    let ledger = Arc::new(InMemoryLedger::new(vec![addr(1)]));
    let connector = ProviderConnector::new(ledger.clone() as Arc<dyn Provider>);
    connector.connect().await?;
    let mut events = connector.events();

    // Same list again: no state change, no event.
    ledger.change_accounts(vec![addr(1)]);
    // A real change, so the watch task has provably processed both.
    ledger.change_accounts(vec![addr(5)]);

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv()).await??;
    assert_eq!(event, ConnectionEvent::AddressChanged(addr(5)));
    assert!(events.try_recv().is_err());

    Ok(())
}

// INVOICE SCENARIOS

#[tokio::test]
async fn pay_invoice_happy_path_notifies_exactly_once() -> anyhow::Result<()> {
    let (ledger, gateway, mut notices) = setup();

    gateway
        .create_invoice(
            "INV-1",
            "100.00",
            Currency::USD,
            addr(3),
            addr(1),
            due_next_month(),
        )
        .await?;
    gateway.approve_invoice("INV-1").await?;
    gateway.pay_invoice("INV-1", "100.00", Currency::USD).await?;

    assert_eq!(gateway.invoice_status("INV-1").await?, InvoiceStatus::Paid);
    assert_eq!(
        ledger.invoice("INV-1").map(|i| i.status),
        Some(InvoiceStatus::Paid)
    );

    let mut pay_notices = vec![];
    while let Ok(notice) = notices.try_recv() {
        if notice.operation == "pay_invoice" {
            pay_notices.push(notice);
        }
    }
    assert_eq!(pay_notices.len(), 1);
    assert!(pay_notices[0].success);

    Ok(())
}

#[tokio::test]
async fn operations_connect_implicitly_exactly_once() -> anyhow::Result<()> {
    let (_, gateway, _) = setup();

    assert_eq!(gateway.connector().current_address(), None);

    gateway
        .create_invoice(
            "INV-lazy",
            "50.00",
            Currency::EUR,
            addr(3),
            addr(1),
            due_next_month(),
        )
        .await?;

    // The implicit connect cached the first account.
    assert_eq!(gateway.connector().current_address(), Some(addr(1)));

    Ok(())
}

#[tokio::test]
async fn failed_implicit_connect_aborts_the_operation() {
    let (ledger, gateway, _) = setup();
    ledger.set_reject_prompt(true);

    let result = gateway.approve_invoice("INV-1").await;

    assert!(matches!(result, Err(ClientError::UserRejected)));
    assert!(ledger.invoice("INV-1").is_none());
}

#[tokio::test]
async fn validation_failures_never_reach_the_ledger() {
    let (ledger, gateway, mut notices) = setup();

    let result = gateway
        .create_invoice("", "10.00", Currency::USD, addr(3), addr(1), due_next_month())
        .await;
    assert!(matches!(result, Err(ClientError::InvalidArgument(_))));

    let result = gateway
        .create_invoice(
            "INV-1",
            "1.001",
            Currency::USD,
            addr(3),
            addr(1),
            due_next_month(),
        )
        .await;
    assert!(matches!(result, Err(ClientError::Precision { .. })));

    // Failed fast: no connection was even established, nothing was notified.
    assert_eq!(gateway.connector().current_address(), None);
    assert!(ledger.invoice("INV-1").is_none());
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn reverted_execution_leaves_connection_untouched() -> anyhow::Result<()> {
    let (_, gateway, mut notices) = setup();

    // Paying an invoice that was never created reverts on the ledger.
    let result = gateway.pay_invoice("INV-ghost", "10.00", Currency::USD).await;
    assert!(matches!(result, Err(ClientError::Reverted { .. })));

    let connection = gateway.connector().connection();
    assert!(connection.is_connected);
    assert_eq!(connection.active_address, Some(addr(1)));

    let notice = notices.try_recv()?;
    assert!(!notice.success);
    assert_eq!(notice.operation, "pay_invoice");

    Ok(())
}

#[tokio::test]
async fn wrong_payment_value_reverts() -> anyhow::Result<()> {
    let (ledger, gateway, _) = setup();

    gateway
        .create_invoice(
            "INV-1",
            "100.00",
            Currency::USD,
            addr(3),
            addr(1),
            due_next_month(),
        )
        .await?;
    gateway.approve_invoice("INV-1").await?;

    let result = gateway.pay_invoice("INV-1", "99.99", Currency::USD).await;
    assert!(matches!(result, Err(ClientError::Reverted { .. })));

    // No partial transfer: the invoice is still merely approved.
    assert_eq!(
        ledger.invoice("INV-1").map(|i| i.status),
        Some(InvoiceStatus::Approved)
    );

    Ok(())
}

#[tokio::test]
async fn declined_signing_prompt_never_reaches_pending() -> anyhow::Result<()> {
    let (ledger, gateway, _) = setup();
    gateway.connector().connect().await?;

    ledger.set_reject_signing(true);
    let result = gateway
        .create_invoice(
            "INV-1",
            "10.00",
            Currency::USD,
            addr(3),
            addr(1),
            due_next_month(),
        )
        .await;

    assert!(matches!(result, Err(ClientError::UserRejected)));
    assert!(ledger.invoice("INV-1").is_none());

    Ok(())
}

#[tokio::test]
async fn receipt_timeout_reports_unknown_outcome() -> anyhow::Result<()> {
    let ledger = Arc::new(InMemoryLedger::new(vec![addr(1)]));
    let gateway = ContractGateway::new(
        ledger.clone() as Arc<dyn Provider>,
        Arc::new(NullNotifier),
        ClientConfig {
            receipt_timeout: Duration::from_millis(50),
        },
    );
    ledger.set_drop_receipts(true);

    let result = gateway
        .create_invoice(
            "INV-1",
            "10.00",
            Currency::USD,
            addr(3),
            addr(1),
            due_next_month(),
        )
        .await;

    // Outcome unknown locally, yet the call did execute ledger-side: exactly
    // why a Network error must never be treated as a failure.
    assert!(matches!(result, Err(ClientError::Network(_))));
    assert!(ledger.invoice("INV-1").is_some());

    Ok(())
}

#[tokio::test]
async fn drifted_status_codes_surface_as_unrecognized() -> anyhow::Result<()> {
    let (ledger, gateway, _) = setup();

    gateway
        .create_invoice(
            "INV-1",
            "10.00",
            Currency::USD,
            addr(3),
            addr(1),
            due_next_month(),
        )
        .await?;

    ledger.force_status_code(9);
    let result = gateway.invoice_status("INV-1").await;

    assert!(matches!(
        result,
        Err(ClientError::UnrecognizedStatus { code: 9 })
    ));

    Ok(())
}

#[tokio::test]
async fn concurrent_duplicate_creates_revert_exactly_one() -> anyhow::Result<()> {
    let (_, gateway, _) = setup();
    let gateway = Arc::new(gateway);

    // Both are submitted; the ledger's ordering decides which one loses, and
    // the client must not assume which.
    let first = tokio::spawn({
        let gateway = Arc::clone(&gateway);
        async move {
            gateway
                .create_invoice(
                    "INV-dup",
                    "10.00",
                    Currency::USD,
                    addr(3),
                    addr(1),
                    due_next_month(),
                )
                .await
        }
    });
    let second = tokio::spawn({
        let gateway = Arc::clone(&gateway);
        async move {
            gateway
                .create_invoice(
                    "INV-dup",
                    "10.00",
                    Currency::USD,
                    addr(3),
                    addr(1),
                    due_next_month(),
                )
                .await
        }
    });

    let outcomes = [first.await?, second.await?];
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    let reverts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(ClientError::Reverted { .. })))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(reverts, 1);

    Ok(())
}

#[tokio::test]
async fn overdue_invoices_read_back_as_expired() -> anyhow::Result<()> {
    let (_, gateway, _) = setup();

    let past_due = TimeStamp::from(Utc::now() - chrono::Duration::seconds(1));
    gateway
        .create_invoice("INV-old", "10.00", Currency::USD, addr(3), addr(1), past_due)
        .await?;

    assert_eq!(
        gateway.invoice_status("INV-old").await?,
        InvoiceStatus::Expired
    );

    // Expiry is terminal: approval now reverts.
    let result = gateway.approve_invoice("INV-old").await;
    assert!(matches!(result, Err(ClientError::Reverted { .. })));

    Ok(())
}

// LETTER-OF-CREDIT SCENARIOS

#[tokio::test]
async fn letter_of_credit_release_path() -> anyhow::Result<()> {
    let (_, gateway, _) = setup();

    gateway
        .create_letter_of_credit(
            "LC-1",
            addr(1),
            addr(3),
            "5000.00",
            Currency::EUR,
            "CIF Rotterdam, 60 days",
        )
        .await?;
    assert_eq!(gateway.lc_status("LC-1").await?, LcStatus::Created);

    gateway.approve_lc_documents("LC-1").await?;
    gateway.release_lc_payment("LC-1").await?;

    assert_eq!(gateway.lc_status("LC-1").await?, LcStatus::PaymentReleased);

    Ok(())
}

#[tokio::test]
async fn letter_of_credit_rejection_carries_the_reason() -> anyhow::Result<()> {
    let (ledger, gateway, _) = setup();

    gateway
        .create_letter_of_credit(
            "LC-2",
            addr(1),
            addr(3),
            "5000.00",
            Currency::EUR,
            "FOB Shanghai",
        )
        .await?;
    gateway
        .reject_lc_documents("LC-2", "bill of lading is stale")
        .await?;

    assert_eq!(gateway.lc_status("LC-2").await?, LcStatus::DocumentsRejected);
    assert_eq!(
        ledger.letter_of_credit("LC-2").and_then(|lc| lc.reject_reason),
        Some("bill of lading is stale".to_string())
    );

    // Terminal: releasing a rejected credit reverts.
    let result = gateway.release_lc_payment("LC-2").await;
    assert!(matches!(result, Err(ClientError::Reverted { .. })));

    Ok(())
}

// SUPPLY-CHAIN-FINANCING SCENARIOS

#[tokio::test]
async fn financing_disburse_and_repay_with_interest() -> anyhow::Result<()> {
    let (ledger, gateway, _) = setup();

    // 2.5% over the financing period on a 1000.00 principal.
    gateway
        .create_supply_chain_financing(
            "SCF-1",
            addr(3),
            addr(1),
            "1000.00",
            Currency::USD,
            250,
            6,
        )
        .await?;
    gateway
        .approve_supply_chain_financing("SCF-1", "1000.00", Currency::USD)
        .await?;

    // Short repayment reverts, full repayment settles.
    let result = gateway
        .repay_supply_chain_financing("SCF-1", "1000.00", Currency::USD)
        .await;
    assert!(matches!(result, Err(ClientError::Reverted { .. })));

    gateway
        .repay_supply_chain_financing("SCF-1", "1025.00", Currency::USD)
        .await?;

    let financing = ledger.financing("SCF-1").unwrap();
    assert!(financing.is_approved);
    assert!(financing.is_repaid);

    Ok(())
}

#[tokio::test]
async fn financing_rejects_zero_duration_locally() {
    let (ledger, gateway, _) = setup();

    let result = gateway
        .create_supply_chain_financing("SCF-0", addr(3), addr(1), "10.00", Currency::USD, 100, 0)
        .await;

    assert!(matches!(result, Err(ClientError::InvalidArgument(_))));
    assert!(ledger.financing("SCF-0").is_none());
}
