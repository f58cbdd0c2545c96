//! Payment claim lifecycle.
//!
//! Ties the record state machine to persistence and receipt storage. Each
//! operation is one [`LedgerStore::update`] cycle; debtor-side operations
//! re-resolve their snapshot inside that cycle before touching anything.
//!
//! ```text
//! Unpaid --submit_cash--> PendingCash --approve_cash--> Settled
//! Unpaid --submit_card--> PendingCard --approve_card--> Settled
//! ```

use crate::amount::Amount;
use crate::auth::ManagerGrant;
use crate::config::Config;
use crate::debtor::{DebtorId, DebtorRecord, PaymentState};
use crate::error::{LedgerError, Result};
use crate::receipt::ReceiptStore;
use crate::resolver::{self, DebtorSnapshot};
use crate::store::LedgerStore;
use chrono::Local;
use log::{debug, info, warn};
use std::path::Path;

/// Result of a debtor submitting a payment claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Submitted,
    /// A claim is already outstanding or the debt is settled; the record is
    /// unchanged. Carries the state that blocked the claim.
    Duplicate(PaymentState),
}

/// Result of a manager approving a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved,
    /// No claim of the requested kind is pending.
    NothingToApprove,
}

#[derive(Clone, Copy)]
enum ClaimKind {
    Cash,
    Card,
}

/// Settlement operations over a ledger and its receipt directory.
pub struct PaymentLifecycle<'a> {
    store: &'a LedgerStore,
    receipts: &'a ReceiptStore,
    approver: String,
}

impl<'a> PaymentLifecycle<'a> {
    pub fn new(store: &'a LedgerStore, receipts: &'a ReceiptStore, config: &Config) -> Self {
        PaymentLifecycle {
            store,
            receipts,
            approver: config.approver.clone(),
        }
    }

    /// Registers a cash claim for the displayed record.
    pub fn submit_cash(&self, snapshot: &DebtorSnapshot) -> Result<ClaimOutcome> {
        let outcome = self.store.update(|ledger| {
            resolver::reresolve(snapshot, ledger)?;
            let record = ledger
                .get_mut(snapshot.id)
                .ok_or_else(|| LedgerError::NotFound(snapshot.id.to_string()))?;
            if record.submit_cash() {
                Ok(ClaimOutcome::Submitted)
            } else {
                Ok(ClaimOutcome::Duplicate(record.state().clone()))
            }
        })?;
        self.log_claim(snapshot, ClaimKind::Cash, &outcome);
        Ok(outcome)
    }

    /// Registers a card claim, copying `source` into receipt storage.
    ///
    /// Nothing is copied when the record cannot take a claim. If the claim is
    /// refused after the copy (the record changed in between), the copy is
    /// removed again.
    pub fn submit_card(&self, snapshot: &DebtorSnapshot, source: &Path) -> Result<ClaimOutcome> {
        let ledger = self.store.load()?;
        let idx = resolver::reresolve(snapshot, &ledger)?;
        let state = ledger.debtors()[idx].state();
        if *state != PaymentState::Unpaid {
            let outcome = ClaimOutcome::Duplicate(state.clone());
            self.log_claim(snapshot, ClaimKind::Card, &outcome);
            return Ok(outcome);
        }

        let stored = self.receipts.attach(source)?;
        let stored = stored.to_string_lossy().into_owned();

        let result = self.store.update(|ledger| {
            resolver::reresolve(snapshot, ledger)?;
            let record = ledger
                .get_mut(snapshot.id)
                .ok_or_else(|| LedgerError::NotFound(snapshot.id.to_string()))?;
            if record.submit_card(stored.clone()) {
                Ok(ClaimOutcome::Submitted)
            } else {
                Ok(ClaimOutcome::Duplicate(record.state().clone()))
            }
        });

        if !matches!(result, Ok(ClaimOutcome::Submitted)) {
            self.receipts.release(&stored);
        }
        if let Ok(outcome) = &result {
            self.log_claim(snapshot, ClaimKind::Card, outcome);
        }
        result
    }

    /// Settles a pending cash claim.
    pub fn approve_cash(&self, _grant: &ManagerGrant, id: DebtorId) -> Result<ApprovalOutcome> {
        self.approve(id, ClaimKind::Cash)
    }

    /// Settles a pending card claim. The receipt stays attached.
    pub fn approve_card(&self, _grant: &ManagerGrant, id: DebtorId) -> Result<ApprovalOutcome> {
        self.approve(id, ClaimKind::Card)
    }

    fn approve(&self, id: DebtorId, kind: ClaimKind) -> Result<ApprovalOutcome> {
        let settled_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let approver = self.approver.as_str();

        let outcome = self.store.update(|ledger| {
            let record = ledger
                .get_mut(id)
                .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
            let approved = match kind {
                ClaimKind::Cash => record.approve_cash(settled_at, approver),
                ClaimKind::Card => record.approve_card(settled_at, approver),
            };
            Ok(if approved {
                ApprovalOutcome::Approved
            } else {
                ApprovalOutcome::NothingToApprove
            })
        })?;

        match outcome {
            ApprovalOutcome::Approved => {
                info!("{}: {} claim approved by {}", id, kind.label(), approver)
            }
            ApprovalOutcome::NothingToApprove => {
                debug!("{}: no pending {} claim to approve", id, kind.label())
            }
        }
        Ok(outcome)
    }

    /// Adds a new unpaid record.
    pub fn add(&self, _grant: &ManagerGrant, name: &str, amount_due: Amount) -> Result<DebtorId> {
        let id = self.store.update(|ledger| ledger.add(name, amount_due))?;
        info!("{}: added '{}' owing {}", id, name.trim(), amount_due);
        Ok(id)
    }

    /// Changes a record's name and/or amount.
    ///
    /// An outstanding claim is kept as is even though it was made against the
    /// old values. Settled records cannot be edited.
    pub fn edit(
        &self,
        _grant: &ManagerGrant,
        id: DebtorId,
        name: Option<&str>,
        amount_due: Option<Amount>,
    ) -> Result<()> {
        self.store.update(|ledger| {
            let record = ledger
                .get_mut(id)
                .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
            let new_name = name.unwrap_or(record.name()).to_string();
            let new_amount = amount_due.unwrap_or(record.amount_due());
            record.edit(&new_name, new_amount)?;
            if record.state().is_pending() {
                warn!(
                    "{}: edited while a {} claim is outstanding; the claim is kept",
                    id,
                    record.state()
                );
            }
            Ok(())
        })?;
        debug!("{}: edited", id);
        Ok(())
    }

    /// Removes a record and its receipt.
    pub fn delete(&self, _grant: &ManagerGrant, id: DebtorId) -> Result<DebtorRecord> {
        let removed = self.store.update(|ledger| {
            ledger
                .remove(id)
                .ok_or_else(|| LedgerError::NotFound(id.to_string()))
        })?;
        if let Some(receipt) = removed.receipt_path() {
            self.receipts.release(receipt);
        }
        info!("{}: deleted '{}'", id, removed.name());
        Ok(removed)
    }

    /// Removes every record and every attached receipt. Returns how many
    /// records were removed.
    pub fn reset_all(&self, _grant: &ManagerGrant) -> Result<usize> {
        let removed = self.store.update(|ledger| Ok(ledger.clear()))?;
        for record in &removed {
            if let Some(receipt) = record.receipt_path() {
                self.receipts.release(receipt);
            }
        }
        info!("Ledger reset, {} records removed", removed.len());
        Ok(removed.len())
    }

    fn log_claim(&self, snapshot: &DebtorSnapshot, kind: ClaimKind, outcome: &ClaimOutcome) {
        match outcome {
            ClaimOutcome::Submitted => {
                info!("{}: {} claim submitted", snapshot.id, kind.label())
            }
            ClaimOutcome::Duplicate(state) => debug!(
                "{}: {} claim refused, record is {}",
                snapshot.id,
                kind.label(),
                state
            ),
        }
    }
}

impl ClaimKind {
    fn label(self) -> &'static str {
        match self {
            ClaimKind::Cash => "cash",
            ClaimKind::Card => "card",
        }
    }
}
