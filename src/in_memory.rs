//! In-memory provider carrying the contract's own transition rules
//!
//! Stands in for a real wallet/provider plus ledger so the connector and
//! gateway can be exercised end to end. Failure modes (unavailable provider,
//! declined prompts, dropped receipts, drifted status codes) are scriptable.
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Notify, mpsc};
use tracing::debug;

use crate::address::Address;
use crate::call::{Arg, CallData, Function, TxHash};
use crate::error::ClientError;
use crate::provider::{Provider, Receipt, SubmittedCall};
use crate::types::{Invoice, InvoiceStatus, LcStatus, LetterOfCredit, SupplyChainFinancing, TimeStamp};

#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    reject_prompt: bool,
    reject_signing: bool,
    drop_receipts: bool,
    forced_status_code: Option<u8>,
}

#[derive(Default)]
struct Inner {
    accounts: Vec<Address>,
    faults: Faults,
    subscribers: Vec<mpsc::UnboundedSender<Vec<Address>>>,
    invoices: HashMap<String, Invoice>,
    credits: HashMap<String, LetterOfCredit>,
    financings: HashMap<String, SupplyChainFinancing>,
    receipts: HashMap<TxHash, bool>,
    nonce: u64,
}

pub struct InMemoryLedger {
    inner: Mutex<Inner>,
    mined: Notify,
}

impl InMemoryLedger {
    pub fn new(accounts: Vec<Address>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                accounts,
                ..Inner::default()
            }),
            mined: Notify::new(),
        }
    }

    // Fault scripting

    pub fn set_unavailable(&self, on: bool) {
        self.inner.lock().unwrap().faults.unavailable = on;
    }

    pub fn set_reject_prompt(&self, on: bool) {
        self.inner.lock().unwrap().faults.reject_prompt = on;
    }

    pub fn set_reject_signing(&self, on: bool) {
        self.inner.lock().unwrap().faults.reject_signing = on;
    }

    /// Submitted calls still execute, but no receipt is ever delivered.
    pub fn set_drop_receipts(&self, on: bool) {
        self.inner.lock().unwrap().faults.drop_receipts = on;
    }

    /// Every status read reports `code`, simulating contract schema drift.
    pub fn force_status_code(&self, code: u8) {
        self.inner.lock().unwrap().faults.forced_status_code = Some(code);
    }

    /// Replace the account list and push the change to every subscriber.
    pub fn change_accounts(&self, accounts: Vec<Address>) {
        let mut inner = self.inner.lock().unwrap();
        inner.accounts = accounts.clone();
        inner
            .subscribers
            .retain(|tx| tx.send(accounts.clone()).is_ok());
    }

    // Ledger-state inspection

    pub fn invoice(&self, id: &str) -> Option<Invoice> {
        self.inner.lock().unwrap().invoices.get(id).cloned()
    }

    pub fn letter_of_credit(&self, id: &str) -> Option<LetterOfCredit> {
        self.inner.lock().unwrap().credits.get(id).cloned()
    }

    pub fn financing(&self, id: &str) -> Option<SupplyChainFinancing> {
        self.inner.lock().unwrap().financings.get(id).cloned()
    }
}

#[async_trait]
impl Provider for InMemoryLedger {
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        let inner = self.inner.lock().unwrap();
        if inner.faults.unavailable {
            return Err(ClientError::ProviderUnavailable);
        }
        if inner.faults.reject_prompt {
            return Err(ClientError::UserRejected);
        }
        Ok(inner.accounts.clone())
    }

    async fn accounts(&self) -> Vec<Address> {
        self.inner.lock().unwrap().accounts.clone()
    }

    async fn submit_call(&self, call: SubmittedCall) -> Result<TxHash, ClientError> {
        let wire = call.call.to_wire()?;
        let mut inner = self.inner.lock().unwrap();
        if inner.faults.unavailable {
            return Err(ClientError::ProviderUnavailable);
        }
        if inner.faults.reject_signing {
            return Err(ClientError::UserRejected);
        }
        if !inner.accounts.contains(&call.from) {
            return Err(ClientError::Submission(format!(
                "unknown account {}",
                call.from
            )));
        }

        inner.nonce += 1;
        let tx_hash = TxHash::derive(&wire, inner.nonce);
        let success = match inner.apply(&call) {
            Ok(()) => true,
            Err(reason) => {
                debug!(%tx_hash, reason, "execution reverted");
                false
            }
        };
        inner.receipts.insert(tx_hash.clone(), success);
        drop(inner);

        self.mined.notify_waiters();
        Ok(tx_hash)
    }

    async fn wait_receipt(&self, tx_hash: &TxHash) -> Result<Receipt, ClientError> {
        loop {
            let notified = self.mined.notified();
            {
                let inner = self.inner.lock().unwrap();
                if !inner.faults.drop_receipts {
                    if let Some(success) = inner.receipts.get(tx_hash).copied() {
                        return Ok(Receipt {
                            tx_hash: tx_hash.clone(),
                            success,
                        });
                    }
                }
            }
            notified.await;
        }
    }

    async fn read_call(&self, call: CallData) -> Result<Vec<u8>, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(code) = inner.faults.forced_status_code {
            return Ok(vec![code]);
        }

        match (call.function, call.args.as_slice()) {
            (Function::GetInvoiceStatus, [Arg::Str(id)]) => {
                let invoice = inner
                    .invoices
                    .get_mut(id)
                    .ok_or_else(|| ClientError::Submission(format!("unknown invoice {id}")))?;
                expire_if_due(invoice);
                Ok(vec![invoice.status.code()])
            }
            (Function::GetLcStatus, [Arg::Str(id)]) => {
                let credit = inner
                    .credits
                    .get(id)
                    .ok_or_else(|| ClientError::Submission(format!("unknown letter of credit {id}")))?;
                Ok(vec![credit.status.code()])
            }
            _ => Err(ClientError::Submission("not a read-only call".into())),
        }
    }

    fn subscribe_accounts(&self) -> mpsc::UnboundedReceiver<Vec<Address>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().unwrap().subscribers.push(tx);
        rx
    }
}

impl Inner {
    /// Execute the call against ledger state. `Err` is the revert reason.
    fn apply(&mut self, call: &SubmittedCall) -> Result<(), String> {
        match (call.call.function, call.call.args.as_slice()) {
            (
                Function::CreateInvoice,
                [
                    Arg::Str(id),
                    Arg::Amount(amount),
                    Arg::Addr(exporter),
                    Arg::Addr(importer),
                    Arg::Uint(due),
                ],
            ) => {
                if self.invoices.contains_key(id) {
                    return Err(format!("invoice {id} already exists"));
                }
                let due_date = TimeStamp::from_unix_seconds(*due as i64)
                    .ok_or_else(|| "due date out of range".to_string())?;
                self.invoices.insert(
                    id.clone(),
                    Invoice {
                        id: id.clone(),
                        amount: *amount,
                        exporter: *exporter,
                        importer: *importer,
                        due_date,
                        status: InvoiceStatus::Created,
                    },
                );
                Ok(())
            }
            (Function::ApproveInvoice, [Arg::Str(id)]) => {
                let invoice = self
                    .invoices
                    .get_mut(id)
                    .ok_or_else(|| format!("unknown invoice {id}"))?;
                expire_if_due(invoice);
                if invoice.status != InvoiceStatus::Created {
                    return Err(format!("invoice {id} is {:?}", invoice.status));
                }
                invoice.status = InvoiceStatus::Approved;
                Ok(())
            }
            (Function::PayInvoice, [Arg::Str(id)]) => {
                let invoice = self
                    .invoices
                    .get_mut(id)
                    .ok_or_else(|| format!("unknown invoice {id}"))?;
                expire_if_due(invoice);
                if invoice.status != InvoiceStatus::Approved {
                    return Err(format!("invoice {id} is {:?}", invoice.status));
                }
                if call.value != invoice.amount {
                    return Err(format!(
                        "payment of {} does not match invoice amount {}",
                        call.value.value(),
                        invoice.amount.value()
                    ));
                }
                invoice.status = InvoiceStatus::Paid;
                Ok(())
            }
            (
                Function::CreateLetterOfCredit,
                [
                    Arg::Str(id),
                    Arg::Addr(importer),
                    Arg::Addr(exporter),
                    Arg::Amount(amount),
                    Arg::Str(terms),
                ],
            ) => {
                if self.credits.contains_key(id) {
                    return Err(format!("letter of credit {id} already exists"));
                }
                if call.value != *amount {
                    return Err("escrowed value does not match the issued amount".into());
                }
                self.credits.insert(
                    id.clone(),
                    LetterOfCredit {
                        id: id.clone(),
                        importer: *importer,
                        exporter: *exporter,
                        amount: *amount,
                        terms: terms.clone(),
                        status: LcStatus::Created,
                        reject_reason: None,
                    },
                );
                Ok(())
            }
            (Function::ApproveLcDocuments, [Arg::Str(id)]) => {
                let credit = self
                    .credits
                    .get_mut(id)
                    .ok_or_else(|| format!("unknown letter of credit {id}"))?;
                if !matches!(
                    credit.status,
                    LcStatus::Created | LcStatus::DocumentsSubmitted
                ) {
                    return Err(format!("letter of credit {id} is {:?}", credit.status));
                }
                credit.status = LcStatus::DocumentsApproved;
                Ok(())
            }
            (Function::RejectLcDocuments, [Arg::Str(id), Arg::Str(reason)]) => {
                let credit = self
                    .credits
                    .get_mut(id)
                    .ok_or_else(|| format!("unknown letter of credit {id}"))?;
                if !matches!(
                    credit.status,
                    LcStatus::Created | LcStatus::DocumentsSubmitted
                ) {
                    return Err(format!("letter of credit {id} is {:?}", credit.status));
                }
                credit.status = LcStatus::DocumentsRejected;
                credit.reject_reason = Some(reason.clone());
                Ok(())
            }
            (Function::ReleaseLcPayment, [Arg::Str(id)]) => {
                let credit = self
                    .credits
                    .get_mut(id)
                    .ok_or_else(|| format!("unknown letter of credit {id}"))?;
                if credit.status != LcStatus::DocumentsApproved {
                    return Err(format!("letter of credit {id} is {:?}", credit.status));
                }
                credit.status = LcStatus::PaymentReleased;
                Ok(())
            }
            (
                Function::CreateSupplyChainFinancing,
                [
                    Arg::Str(id),
                    Arg::Addr(supplier),
                    Arg::Addr(buyer),
                    Arg::Amount(amount),
                    Arg::Uint(bps),
                    Arg::Uint(duration),
                ],
            ) => {
                if self.financings.contains_key(id) {
                    return Err(format!("financing {id} already exists"));
                }
                self.financings.insert(
                    id.clone(),
                    SupplyChainFinancing {
                        id: id.clone(),
                        supplier: *supplier,
                        buyer: *buyer,
                        amount: *amount,
                        interest_rate_bps: *bps as u32,
                        duration_periods: *duration as u32,
                        is_approved: false,
                        is_repaid: false,
                    },
                );
                Ok(())
            }
            (Function::ApproveSupplyChainFinancing, [Arg::Str(id)]) => {
                let financing = self
                    .financings
                    .get_mut(id)
                    .ok_or_else(|| format!("unknown financing {id}"))?;
                if financing.is_approved {
                    return Err(format!("financing {id} is already approved"));
                }
                if call.value != financing.amount {
                    return Err("disbursed value does not match the principal".into());
                }
                financing.is_approved = true;
                Ok(())
            }
            (Function::RepaySupplyChainFinancing, [Arg::Str(id)]) => {
                let financing = self
                    .financings
                    .get_mut(id)
                    .ok_or_else(|| format!("unknown financing {id}"))?;
                if !financing.is_approved {
                    return Err(format!("financing {id} was never approved"));
                }
                if financing.is_repaid {
                    return Err(format!("financing {id} is already repaid"));
                }
                let principal = financing.amount.value();
                let interest = principal * financing.interest_rate_bps as u128 / 10_000;
                if call.value.value() != principal + interest {
                    return Err(format!(
                        "repayment of {} does not cover principal plus interest {}",
                        call.value.value(),
                        principal + interest
                    ));
                }
                financing.is_repaid = true;
                Ok(())
            }
            _ => Err("malformed argument list".into()),
        }
    }
}

// Invoices in a non-terminal state expire once their due date passes.
fn expire_if_due(invoice: &mut Invoice) {
    if matches!(
        invoice.status,
        InvoiceStatus::Created | InvoiceStatus::Approved
    ) && invoice.due_date.to_datetime_utc() < Utc::now()
    {
        invoice.status = InvoiceStatus::Expired;
    }
}
