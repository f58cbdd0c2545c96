//! Name search and re-resolution of displayed records.
//!
//! A debtor picks a record from search results and acts on it later, by which
//! time the ledger may have been reloaded and edited. Before any claim is
//! applied the displayed snapshot is located again in the fresh ledger.

use crate::amount::Amount;
use crate::debtor::{DebtorId, DebtorRecord};
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;

/// What a caller displayed about a record at search time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtorSnapshot {
    pub id: DebtorId,
    pub name: String,
    pub amount_due: Amount,
}

impl From<&DebtorRecord> for DebtorSnapshot {
    fn from(record: &DebtorRecord) -> Self {
        DebtorSnapshot {
            id: record.id(),
            name: record.name().to_string(),
            amount_due: record.amount_due(),
        }
    }
}

/// Case-insensitive substring search on names.
///
/// An empty (or all-whitespace) query matches nothing rather than everyone.
pub fn search<'a>(query: &str, ledger: &'a Ledger) -> Vec<&'a DebtorRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    ledger
        .debtors()
        .iter()
        .filter(|d| d.name().to_lowercase().contains(&needle))
        .collect()
}

/// Finds the snapshot's record in `ledger` and returns its current position.
///
/// The record must still exist under the same id with the same name and
/// amount; if the manager edited or deleted it in the meantime the caller gets
/// [`LedgerError::NotFound`] and has to search again.
pub fn reresolve(snapshot: &DebtorSnapshot, ledger: &Ledger) -> Result<usize> {
    let idx = ledger
        .position(snapshot.id)
        .ok_or_else(|| LedgerError::NotFound(format!("{} no longer exists", snapshot.id)))?;
    let current = &ledger.debtors()[idx];
    if current.name() != snapshot.name || current.amount_due() != snapshot.amount_due {
        return Err(LedgerError::NotFound(format!(
            "{} changed since it was displayed (now '{}', {})",
            snapshot.id,
            current.name(),
            current.amount_due()
        )));
    }
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new("hash".to_string());
        ledger.add("Ali Karimi", Amount::from_str("50000").unwrap()).unwrap();
        ledger.add("Sara", Amount::from_str("20000").unwrap()).unwrap();
        ledger.add("ali", Amount::from_str("1000").unwrap()).unwrap();
        ledger
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let ledger = ledger();
        let names: Vec<_> = search("ALI", &ledger).iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Ali Karimi", "ali"]);
        assert_eq!(search("  kar ", &ledger).len(), 1);
        assert!(search("reza", &ledger).is_empty());
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let ledger = ledger();
        assert!(search("", &ledger).is_empty());
        assert!(search("   ", &ledger).is_empty());
    }

    #[test]
    fn test_reresolve_after_reorder() {
        let mut ledger = ledger();
        let snapshot = DebtorSnapshot::from(search("sara", &ledger)[0]);
        let first = ledger.debtors()[0].id();
        ledger.remove(first);

        assert_eq!(reresolve(&snapshot, &ledger).unwrap(), 0);
    }

    #[test]
    fn test_reresolve_detects_edit() {
        let mut ledger = ledger();
        let snapshot = DebtorSnapshot::from(search("sara", &ledger)[0]);
        ledger
            .get_mut(snapshot.id)
            .unwrap()
            .edit("Sara", Amount::from_str("25000").unwrap())
            .unwrap();

        assert!(matches!(
            reresolve(&snapshot, &ledger),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn test_reresolve_detects_deletion() {
        let mut ledger = ledger();
        let snapshot = DebtorSnapshot::from(search("sara", &ledger)[0]);
        ledger.remove(snapshot.id);

        assert!(matches!(
            reresolve(&snapshot, &ledger),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_names_resolve_by_id() {
        let mut ledger = ledger();
        let twin = ledger.add("Sara", Amount::from_str("20000").unwrap()).unwrap();
        let snapshot = DebtorSnapshot::from(ledger.get(twin).unwrap());

        assert_eq!(reresolve(&snapshot, &ledger).unwrap(), 3);
    }
}
