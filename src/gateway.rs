//! Service layer binding the contract's function surface to a connection
//!
//! One operation per trade-finance primitive. Every operation validates its
//! inputs locally first, lazily connects exactly once if no connection is
//! live, converts decimal amounts through the codec, then submits through
//! the lifecycle manager and reports the outcome to the notifier.
use std::sync::Arc;

use tracing::debug;

use crate::address::Address;
use crate::amount::{self, Currency, MinorUnits};
use crate::call::{Arg, CallData, Function};
use crate::connector::ProviderConnector;
use crate::error::ClientError;
use crate::lifecycle::{ClientConfig, TxLifecycle};
use crate::notify::{Notice, Notifier};
use crate::provider::{Provider, Receipt, SubmittedCall};
use crate::status;
use crate::types::{InvoiceStatus, LcStatus, TimeStamp};

pub struct ContractGateway {
    provider: Arc<dyn Provider>,
    connector: Arc<ProviderConnector>,
    lifecycle: TxLifecycle,
    notifier: Arc<dyn Notifier>,
}

impl ContractGateway {
    pub fn new(
        provider: Arc<dyn Provider>,
        notifier: Arc<dyn Notifier>,
        config: ClientConfig,
    ) -> Self {
        let connector = Arc::new(ProviderConnector::new(Arc::clone(&provider)));
        let lifecycle = TxLifecycle::new(Arc::clone(&provider), config);
        Self {
            provider,
            connector,
            lifecycle,
            notifier,
        }
    }

    /// The connector backing this gateway, for connection events and the
    /// cached address.
    pub fn connector(&self) -> &Arc<ProviderConnector> {
        &self.connector
    }

    // Invoice operations

    pub async fn create_invoice(
        &self,
        id: &str,
        amount: &str,
        currency: Currency,
        exporter: Address,
        importer: Address,
        due_date: TimeStamp<chrono::Utc>,
    ) -> Result<Receipt, ClientError> {
        require_id(id)?;
        let amount = amount::to_minor_units(amount, currency)?;
        let due = due_date.unix_seconds();
        if due <= 0 {
            return Err(ClientError::InvalidArgument(
                "due date precedes the unix epoch".into(),
            ));
        }

        let call = CallData::new(Function::CreateInvoice)
            .arg(Arg::Str(id.to_owned()))
            .arg(Arg::Amount(amount))
            .arg(Arg::Addr(exporter))
            .arg(Arg::Addr(importer))
            .arg(Arg::Uint(due as u64));
        self.execute("create_invoice", call, MinorUnits::ZERO).await
    }

    pub async fn approve_invoice(&self, id: &str) -> Result<Receipt, ClientError> {
        require_id(id)?;
        let call = CallData::new(Function::ApproveInvoice).arg(Arg::Str(id.to_owned()));
        self.execute("approve_invoice", call, MinorUnits::ZERO).await
    }

    /// Pay an approved invoice. The amount rides as the value transferred
    /// with the call, atomically with submission.
    pub async fn pay_invoice(
        &self,
        id: &str,
        amount: &str,
        currency: Currency,
    ) -> Result<Receipt, ClientError> {
        require_id(id)?;
        let value = amount::to_minor_units(amount, currency)?;

        let call = CallData::new(Function::PayInvoice).arg(Arg::Str(id.to_owned()));
        self.execute("pay_invoice", call, value).await
    }

    pub async fn invoice_status(&self, id: &str) -> Result<InvoiceStatus, ClientError> {
        require_id(id)?;
        let call = CallData::new(Function::GetInvoiceStatus).arg(Arg::Str(id.to_owned()));
        let code = self.read_status_code(call).await?;
        status::invoice_status(code)
    }

    // Letter-of-credit operations

    pub async fn create_letter_of_credit(
        &self,
        id: &str,
        importer: Address,
        exporter: Address,
        amount: &str,
        currency: Currency,
        terms: &str,
    ) -> Result<Receipt, ClientError> {
        require_id(id)?;
        if terms.trim().is_empty() {
            return Err(ClientError::InvalidArgument("terms are empty".into()));
        }
        let value = amount::to_minor_units(amount, currency)?;

        let call = CallData::new(Function::CreateLetterOfCredit)
            .arg(Arg::Str(id.to_owned()))
            .arg(Arg::Addr(importer))
            .arg(Arg::Addr(exporter))
            .arg(Arg::Amount(value))
            .arg(Arg::Str(terms.to_owned()));
        // Payable: the issued amount is escrowed at creation.
        self.execute("create_letter_of_credit", call, value).await
    }

    pub async fn approve_lc_documents(&self, id: &str) -> Result<Receipt, ClientError> {
        require_id(id)?;
        let call = CallData::new(Function::ApproveLcDocuments).arg(Arg::Str(id.to_owned()));
        self.execute("approve_lc_documents", call, MinorUnits::ZERO)
            .await
    }

    pub async fn reject_lc_documents(&self, id: &str, reason: &str) -> Result<Receipt, ClientError> {
        require_id(id)?;
        if reason.trim().is_empty() {
            return Err(ClientError::InvalidArgument(
                "rejection reason is empty".into(),
            ));
        }
        let call = CallData::new(Function::RejectLcDocuments)
            .arg(Arg::Str(id.to_owned()))
            .arg(Arg::Str(reason.to_owned()));
        self.execute("reject_lc_documents", call, MinorUnits::ZERO)
            .await
    }

    pub async fn release_lc_payment(&self, id: &str) -> Result<Receipt, ClientError> {
        require_id(id)?;
        let call = CallData::new(Function::ReleaseLcPayment).arg(Arg::Str(id.to_owned()));
        self.execute("release_lc_payment", call, MinorUnits::ZERO)
            .await
    }

    pub async fn lc_status(&self, id: &str) -> Result<LcStatus, ClientError> {
        require_id(id)?;
        let call = CallData::new(Function::GetLcStatus).arg(Arg::Str(id.to_owned()));
        let code = self.read_status_code(call).await?;
        status::lc_status(code)
    }

    // Supply-chain-financing operations

    pub async fn create_supply_chain_financing(
        &self,
        id: &str,
        supplier: Address,
        buyer: Address,
        amount: &str,
        currency: Currency,
        interest_rate_bps: u32,
        duration_periods: u32,
    ) -> Result<Receipt, ClientError> {
        require_id(id)?;
        if duration_periods == 0 {
            return Err(ClientError::InvalidArgument(
                "duration must be at least one period".into(),
            ));
        }
        let amount = amount::to_minor_units(amount, currency)?;

        let call = CallData::new(Function::CreateSupplyChainFinancing)
            .arg(Arg::Str(id.to_owned()))
            .arg(Arg::Addr(supplier))
            .arg(Arg::Addr(buyer))
            .arg(Arg::Amount(amount))
            .arg(Arg::Uint(interest_rate_bps as u64))
            .arg(Arg::Uint(duration_periods as u64));
        self.execute("create_supply_chain_financing", call, MinorUnits::ZERO)
            .await
    }

    /// Approve and disburse: the principal rides as the value transferred.
    pub async fn approve_supply_chain_financing(
        &self,
        id: &str,
        amount: &str,
        currency: Currency,
    ) -> Result<Receipt, ClientError> {
        require_id(id)?;
        let value = amount::to_minor_units(amount, currency)?;

        let call =
            CallData::new(Function::ApproveSupplyChainFinancing).arg(Arg::Str(id.to_owned()));
        self.execute("approve_supply_chain_financing", call, value)
            .await
    }

    /// Repay principal plus interest; the repayment rides as the value.
    pub async fn repay_supply_chain_financing(
        &self,
        id: &str,
        amount: &str,
        currency: Currency,
    ) -> Result<Receipt, ClientError> {
        require_id(id)?;
        let value = amount::to_minor_units(amount, currency)?;

        let call = CallData::new(Function::RepaySupplyChainFinancing).arg(Arg::Str(id.to_owned()));
        self.execute("repay_supply_chain_financing", call, value)
            .await
    }

    // Shared plumbing

    /// Cached address if live, otherwise a single implicit connect attempt.
    /// A failed connect aborts the operation with the connector's error.
    async fn ensure_connected(&self) -> Result<Address, ClientError> {
        if let Some(address) = self.connector.current_address() {
            return Ok(address);
        }
        debug!("no live connection, connecting implicitly");
        let connection = self.connector.connect().await?;
        connection
            .active_address
            .ok_or(ClientError::ProviderUnavailable)
    }

    async fn execute(
        &self,
        operation: &'static str,
        call: CallData,
        value: MinorUnits,
    ) -> Result<Receipt, ClientError> {
        let result = async {
            let from = self.ensure_connected().await?;
            let pending = self.lifecycle.submit(SubmittedCall { from, value, call }).await?;
            self.lifecycle.await_mined(pending).await
        }
        .await;

        match &result {
            Ok(receipt) => self.notifier.notify(Notice::success(
                operation,
                format!("confirmed in transaction {}", receipt.tx_hash),
            )),
            Err(err) => self
                .notifier
                .notify(Notice::failure(operation, err.to_string())),
        }
        result
    }

    async fn read_status_code(&self, call: CallData) -> Result<u8, ClientError> {
        self.ensure_connected().await?;
        let bytes = self.provider.read_call(call).await?;
        bytes
            .first()
            .copied()
            .ok_or_else(|| ClientError::Network("empty status response".into()))
    }
}

fn require_id(id: &str) -> Result<(), ClientError> {
    if id.trim().is_empty() {
        return Err(ClientError::InvalidArgument("id is empty".into()));
    }
    Ok(())
}
