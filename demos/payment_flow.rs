//! Walk an invoice through its full lifecycle against the in-memory ledger.
//!
//! Run with `cargo run --example payment_flow`.

use std::sync::Arc;

use chrono::Utc;
use trade_ledger_client::{
    address::Address,
    amount::Currency,
    gateway::ContractGateway,
    in_memory::InMemoryLedger,
    lifecycle::ClientConfig,
    notify::ChannelNotifier,
    provider::Provider,
    types::TimeStamp,
    utils,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let importer = Address::from_hex("0x00112233445566778899aabbccddeeff00112233")?;
    let exporter = Address::from_hex("0xffeeddccbbaa99887766554433221100ffeeddcc")?;

    // The importer's wallet is the active account.
    let ledger = Arc::new(InMemoryLedger::new(vec![importer]));
    let (notifier, mut notices) = ChannelNotifier::new();
    let gateway = ContractGateway::new(
        ledger.clone() as Arc<dyn Provider>,
        Arc::new(notifier),
        ClientConfig::default(),
    );

    let id = utils::new_reference_id("INV-");
    let due = TimeStamp::from(Utc::now() + chrono::Duration::days(30));

    gateway
        .create_invoice(&id, "2500.00", Currency::USD, exporter, importer, due)
        .await?;
    gateway.approve_invoice(&id).await?;
    gateway.pay_invoice(&id, "2500.00", Currency::USD).await?;

    let status = gateway.invoice_status(&id).await?;
    println!("invoice {id} is now {status:?}");

    while let Ok(notice) = notices.try_recv() {
        let verdict = if notice.success { "ok" } else { "failed" };
        println!("[{verdict}] {}: {}", notice.operation, notice.message);
    }

    Ok(())
}
