//! The ledger document: manager secret plus the ordered debtor records.

use crate::amount::Amount;
use crate::debtor::{DebtorId, DebtorRecord};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Singleton document persisted by [`LedgerStore`](crate::store::LedgerStore).
///
/// Debtors are kept in insertion order. Ids are handed out from `next_id`
/// and never reused within one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// Argon2 PHC string, or a legacy plaintext secret awaiting upgrade.
    #[serde(alias = "password")]
    secret: String,

    #[serde(default)]
    next_id: u64,

    /// Bumped on every checked update; used to detect concurrent writers.
    #[serde(default)]
    revision: u64,

    #[serde(default, alias = "users")]
    debtors: Vec<DebtorRecord>,
}

impl Ledger {
    /// Creates an empty ledger guarded by the given (already hashed) secret.
    pub fn new(secret: String) -> Self {
        Ledger {
            secret,
            next_id: 1,
            revision: 0,
            debtors: Vec::new(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub(crate) fn set_secret(&mut self, secret: String) {
        self.secret = secret;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    pub fn debtors(&self) -> &[DebtorRecord] {
        &self.debtors
    }

    pub fn len(&self) -> usize {
        self.debtors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debtors.is_empty()
    }

    /// Current position of a record in display order.
    pub fn position(&self, id: DebtorId) -> Option<usize> {
        self.debtors.iter().position(|d| d.id() == id)
    }

    pub fn get(&self, id: DebtorId) -> Option<&DebtorRecord> {
        self.debtors.iter().find(|d| d.id() == id)
    }

    pub fn get_mut(&mut self, id: DebtorId) -> Option<&mut DebtorRecord> {
        self.debtors.iter_mut().find(|d| d.id() == id)
    }

    /// Appends a new unpaid record and returns its id.
    pub fn add(&mut self, name: &str, amount_due: Amount) -> Result<DebtorId> {
        let id = DebtorId(self.next_id.max(1));
        let record = DebtorRecord::new(id, name, amount_due)?;
        self.debtors.push(record);
        self.next_id = id.0 + 1;
        Ok(id)
    }

    /// Removes a record, returning it so its receipt can be released.
    pub fn remove(&mut self, id: DebtorId) -> Option<DebtorRecord> {
        let idx = self.position(id)?;
        Some(self.debtors.remove(idx))
    }

    /// Removes every record. `next_id` is kept so old ids stay dead.
    pub fn clear(&mut self) -> Vec<DebtorRecord> {
        std::mem::take(&mut self.debtors)
    }

    /// Records with an outstanding claim, in ledger order.
    pub fn pending(&self) -> impl Iterator<Item = &DebtorRecord> {
        self.debtors.iter().filter(|d| d.state().is_pending())
    }

    /// Gives an id to records that lack one (or share one) and keeps
    /// `next_id` ahead of every id in use. Returns `true` if anything changed.
    pub(crate) fn assign_missing_ids(&mut self) -> bool {
        let max_id = self.debtors.iter().map(|d| d.id().0).max().unwrap_or(0);
        let mut next = self.next_id.max(max_id + 1);
        let mut seen = HashSet::new();
        let mut changed = false;

        for debtor in &mut self.debtors {
            if !debtor.id().is_assigned() || !seen.insert(debtor.id()) {
                debtor.set_id(DebtorId(next));
                seen.insert(debtor.id());
                next += 1;
                changed = true;
            }
        }

        if next != self.next_id {
            self.next_id = next;
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut ledger = Ledger::new("hash".to_string());
        let a = ledger.add("Ali", amount("50000")).unwrap();
        let b = ledger.add("Ali", amount("50000")).unwrap();
        assert_ne!(a, b);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.position(b), Some(1));
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let mut ledger = Ledger::new("hash".to_string());
        assert!(ledger.add("  ", amount("1")).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut ledger = Ledger::new("hash".to_string());
        let first = ledger.add("Ali", amount("1")).unwrap();
        ledger.clear();
        let second = ledger.add("Sara", amount("1")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_remove() {
        let mut ledger = Ledger::new("hash".to_string());
        let id = ledger.add("Ali", amount("1")).unwrap();
        assert_eq!(ledger.remove(id).unwrap().name(), "Ali");
        assert!(ledger.remove(id).is_none());
    }

    #[test]
    fn test_pending_lists_outstanding_claims() {
        let mut ledger = Ledger::new("hash".to_string());
        let a = ledger.add("Ali", amount("1")).unwrap();
        ledger.add("Sara", amount("2")).unwrap();
        ledger.get_mut(a).unwrap().submit_cash();

        let pending: Vec<_> = ledger.pending().map(|d| d.name()).collect();
        assert_eq!(pending, vec!["Ali"]);
    }

    #[test]
    fn test_legacy_document_gets_ids() {
        let json = r#"{"password":"1357","users":[
            {"name":"Ali","debt":50000.0},
            {"name":"Sara","debt":20000.0}
        ]}"#;
        let mut ledger: Ledger = serde_json::from_str(json).unwrap();
        assert!(ledger.assign_missing_ids());
        assert_eq!(ledger.debtors()[0].id(), DebtorId(1));
        assert_eq!(ledger.debtors()[1].id(), DebtorId(2));
        assert!(!ledger.assign_missing_ids());

        let id = ledger.add("Reza", amount("1")).unwrap();
        assert_eq!(id, DebtorId(3));
    }
}
