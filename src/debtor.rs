//! Debtor record model and its settlement state machine.
//!
//! The persisted form carries three independent flags (`settled`,
//! `pendingCash`, `pendingCard`); in memory they collapse into a single
//! [`PaymentState`], so at most one can ever be set.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable identifier assigned when the manager adds a record.
///
/// `0` is never assigned; it marks records loaded from documents written
/// before identifiers existed, which receive one on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebtorId(pub u64);

impl DebtorId {
    pub(crate) const UNASSIGNED: DebtorId = DebtorId(0);

    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for DebtorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a settled debt was paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementMethod {
    Cash,
    /// The receipt is retained after approval so it can still be viewed.
    Card { receipt: String },
}

/// Settlement status of a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentState {
    Unpaid,
    PendingCash,
    PendingCard {
        receipt: String,
    },
    /// Terminal. Only deleting the record removes it.
    Settled {
        method: SettlementMethod,
        settled_at: String,
        approved_by: String,
    },
}

impl PaymentState {
    /// Short status label used in listings and reports.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentState::Unpaid => "unpaid",
            PaymentState::PendingCash => "pending-cash",
            PaymentState::PendingCard { .. } => "pending-card",
            PaymentState::Settled { .. } => "settled",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            PaymentState::PendingCash | PaymentState::PendingCard { .. }
        )
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A person who owes money, with the state of their payment claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredDebtor", into = "StoredDebtor")]
pub struct DebtorRecord {
    id: DebtorId,
    name: String,
    amount_due: Amount,
    state: PaymentState,
}

impl DebtorRecord {
    /// Creates an unpaid record. The name is trimmed and must not be empty.
    pub fn new(id: DebtorId, name: &str, amount_due: Amount) -> Result<Self> {
        Ok(DebtorRecord {
            id,
            name: validate_name(name)?,
            amount_due,
            state: PaymentState::Unpaid,
        })
    }

    pub fn id(&self) -> DebtorId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: DebtorId) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount_due(&self) -> Amount {
        self.amount_due
    }

    pub fn state(&self) -> &PaymentState {
        &self.state
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, PaymentState::Settled { .. })
    }

    pub fn is_pending_cash(&self) -> bool {
        matches!(self.state, PaymentState::PendingCash)
    }

    pub fn is_pending_card(&self) -> bool {
        matches!(self.state, PaymentState::PendingCard { .. })
    }

    /// Path of the attached receipt, if any.
    pub fn receipt_path(&self) -> Option<&str> {
        match &self.state {
            PaymentState::PendingCard { receipt }
            | PaymentState::Settled {
                method: SettlementMethod::Card { receipt },
                ..
            } => Some(receipt.as_str()),
            _ => None,
        }
    }

    /// Registers a cash claim.
    ///
    /// Returns `false` unless the record is `Unpaid`.
    pub fn submit_cash(&mut self) -> bool {
        if self.state != PaymentState::Unpaid {
            return false;
        }
        self.state = PaymentState::PendingCash;
        true
    }

    /// Registers a card claim backed by a stored receipt.
    ///
    /// Returns `false` unless the record is `Unpaid`.
    pub fn submit_card(&mut self, receipt: String) -> bool {
        if self.state != PaymentState::Unpaid {
            return false;
        }
        self.state = PaymentState::PendingCard { receipt };
        true
    }

    /// Settles a pending cash claim.
    ///
    /// Returns `false` if there is no pending cash claim.
    pub fn approve_cash(&mut self, settled_at: String, approved_by: &str) -> bool {
        if !self.is_pending_cash() {
            return false;
        }
        self.state = PaymentState::Settled {
            method: SettlementMethod::Cash,
            settled_at,
            approved_by: approved_by.to_string(),
        };
        true
    }

    /// Settles a pending card claim, keeping the receipt.
    ///
    /// Returns `false` if there is no pending card claim.
    pub fn approve_card(&mut self, settled_at: String, approved_by: &str) -> bool {
        let receipt = match &self.state {
            PaymentState::PendingCard { receipt } => receipt.clone(),
            _ => return false,
        };
        self.state = PaymentState::Settled {
            method: SettlementMethod::Card { receipt },
            settled_at,
            approved_by: approved_by.to_string(),
        };
        true
    }

    /// Changes name and amount. The payment state is left as is, including
    /// an outstanding claim.
    pub fn edit(&mut self, name: &str, amount_due: Amount) -> Result<()> {
        if self.is_settled() {
            return Err(LedgerError::Validation(format!(
                "{} '{}' is settled and can no longer be edited",
                self.id, self.name
            )));
        }
        self.name = validate_name(name)?;
        self.amount_due = amount_due;
        Ok(())
    }
}

/// Trims a display name and rejects empty ones.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation("name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// On-disk shape of a record. Older documents used snake_case keys and no
/// `id`; both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDebtor {
    #[serde(default)]
    id: DebtorId,
    name: String,
    #[serde(alias = "debt")]
    amount_due: Amount,
    #[serde(default, alias = "paid")]
    settled: bool,
    #[serde(default, alias = "pending_cash")]
    pending_cash: bool,
    #[serde(default, alias = "pending_card")]
    pending_card: bool,
    #[serde(default, alias = "receipt")]
    receipt_path: String,
    #[serde(default, alias = "payment_time")]
    settled_at: String,
    #[serde(default, alias = "approved_by")]
    approved_by: String,
}

impl Default for DebtorId {
    fn default() -> Self {
        DebtorId::UNASSIGNED
    }
}

impl TryFrom<StoredDebtor> for DebtorRecord {
    type Error = String;

    fn try_from(stored: StoredDebtor) -> std::result::Result<Self, Self::Error> {
        let name = validate_name(&stored.name).map_err(|e| e.to_string())?;
        let has_receipt = !stored.receipt_path.is_empty();

        let state = match (stored.settled, stored.pending_cash, stored.pending_card) {
            (false, false, false) if !has_receipt => PaymentState::Unpaid,
            (false, true, false) if !has_receipt => PaymentState::PendingCash,
            (false, false, true) if has_receipt => PaymentState::PendingCard {
                receipt: stored.receipt_path,
            },
            (true, false, false) => PaymentState::Settled {
                method: if has_receipt {
                    SettlementMethod::Card {
                        receipt: stored.receipt_path,
                    }
                } else {
                    SettlementMethod::Cash
                },
                settled_at: stored.settled_at,
                approved_by: stored.approved_by,
            },
            (settled, pending_cash, pending_card) => {
                return Err(format!(
                    "record '{}' has inconsistent state (settled={}, pendingCash={}, pendingCard={}, receipt={})",
                    name, settled, pending_cash, pending_card, has_receipt
                ))
            }
        };

        Ok(DebtorRecord {
            id: stored.id,
            name,
            amount_due: stored.amount_due,
            state,
        })
    }
}

impl From<DebtorRecord> for StoredDebtor {
    fn from(record: DebtorRecord) -> Self {
        let mut stored = StoredDebtor {
            id: record.id,
            name: record.name,
            amount_due: record.amount_due,
            settled: false,
            pending_cash: false,
            pending_card: false,
            receipt_path: String::new(),
            settled_at: String::new(),
            approved_by: String::new(),
        };
        match record.state {
            PaymentState::Unpaid => {}
            PaymentState::PendingCash => stored.pending_cash = true,
            PaymentState::PendingCard { receipt } => {
                stored.pending_card = true;
                stored.receipt_path = receipt;
            }
            PaymentState::Settled {
                method,
                settled_at,
                approved_by,
            } => {
                stored.settled = true;
                if let SettlementMethod::Card { receipt } = method {
                    stored.receipt_path = receipt;
                }
                stored.settled_at = settled_at;
                stored.approved_by = approved_by;
            }
        }
        stored
    }
}
