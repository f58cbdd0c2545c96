//! Settlement scenarios driven through the public library API.

use debt_ledger::{
    resolver, Amount, ApprovalOutcome, AuthGate, ClaimOutcome, Config, DebtorSnapshot,
    LedgerError, LedgerStore, PaymentLifecycle, PaymentState, ReceiptStore,
};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tempfile::TempDir;

fn amount(s: &str) -> Amount {
    Amount::from_str(s).unwrap()
}

fn setup() -> (TempDir, Config, LedgerStore, ReceiptStore) {
    let dir = TempDir::new().unwrap();
    let config = Config::in_dir(dir.path());
    let store = config.ledger_store();
    let receipts = config.receipt_store();
    (dir, config, store, receipts)
}

/// What a debtor sees after searching for exactly one name
fn find(store: &LedgerStore, query: &str) -> DebtorSnapshot {
    let ledger = store.load().unwrap();
    let hits = resolver::search(query, &ledger);
    assert_eq!(hits.len(), 1, "expected one match for {query}");
    DebtorSnapshot::from(hits[0])
}

#[test]
fn test_deposit_and_approval_scenario() {
    let (_dir, config, store, receipts) = setup();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    let grant = AuthGate::new(&store).login("1357").unwrap();

    let id = lifecycle.add(&grant, "Ali", amount("50000")).unwrap();
    let ali = find(&store, "ali");
    assert_eq!(lifecycle.submit_cash(&ali).unwrap(), ClaimOutcome::Submitted);

    let ledger = store.load().unwrap();
    let record = ledger.get(id).unwrap();
    assert!(record.is_pending_cash());

    assert_eq!(
        lifecycle.approve_cash(&grant, id).unwrap(),
        ApprovalOutcome::Approved
    );
    let doc: serde_json::Value =
        serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
    let stored = &doc["debtors"][0];
    assert_eq!(stored["settled"], true);
    assert_eq!(stored["pendingCash"], false);
    assert_eq!(stored["approvedBy"], "manager");
    assert_ne!(stored["settledAt"], "");
}

#[test]
fn test_claim_against_concurrently_edited_record() {
    let (dir, config, store, receipts) = setup();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    let grant = AuthGate::new(&store).login("1357").unwrap();
    lifecycle.add(&grant, "Sara", amount("20000")).unwrap();

    let displayed = find(&store, "sara");

    let manager_store = config.ledger_store();
    let manager_side = PaymentLifecycle::new(&manager_store, &receipts, &config);
    manager_side
        .edit(&grant, displayed.id, None, Some(amount("25000")))
        .unwrap();
    let before = fs::read(store.path()).unwrap();

    let source = dir.path().join("card.jpg");
    fs::write(&source, b"jpg").unwrap();
    let result = lifecycle.submit_card(&displayed, &source);

    assert!(matches!(result, Err(LedgerError::NotFound(_))));
    assert_eq!(fs::read(store.path()).unwrap(), before);
    assert!(!receipts.dir().exists());
}

#[test]
fn test_duplicate_claim_scenario() {
    let (dir, config, store, receipts) = setup();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    let grant = AuthGate::new(&store).login("1357").unwrap();
    lifecycle.add(&grant, "Reza", amount("700")).unwrap();

    let reza = find(&store, "reza");
    lifecycle.submit_cash(&reza).unwrap();
    let before = fs::read(store.path()).unwrap();

    let source = dir.path().join("card.jpg");
    fs::write(&source, b"jpg").unwrap();
    assert_eq!(
        lifecycle.submit_card(&reza, &source).unwrap(),
        ClaimOutcome::Duplicate(PaymentState::PendingCash)
    );
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn test_settled_debt_refuses_new_claims() {
    let (_dir, config, store, receipts) = setup();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    let grant = AuthGate::new(&store).login("1357").unwrap();
    let id = lifecycle.add(&grant, "Ali", amount("1")).unwrap();

    lifecycle.submit_cash(&find(&store, "ali")).unwrap();
    lifecycle.approve_cash(&grant, id).unwrap();

    let outcome = lifecycle.submit_cash(&find(&store, "ali")).unwrap();
    assert!(matches!(
        outcome,
        ClaimOutcome::Duplicate(PaymentState::Settled { .. })
    ));
    assert!(lifecycle
        .edit(&grant, id, Some("Someone"), None)
        .is_err());
}

#[test]
fn test_reset_removes_every_receipt() {
    let (dir, config, store, receipts) = setup();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    let grant = AuthGate::new(&store).login("1357").unwrap();
    let source = dir.path().join("r.png");
    fs::write(&source, b"png").unwrap();

    let mut stored = Vec::new();
    for name in ["Ali", "Sara", "Reza"] {
        lifecycle.add(&grant, name, amount("10")).unwrap();
        lifecycle.submit_card(&find(&store, name), &source).unwrap();
        let ledger = store.load().unwrap();
        let snapshot = find(&store, name);
        stored.push(
            ledger
                .get(snapshot.id)
                .unwrap()
                .receipt_path()
                .unwrap()
                .to_string(),
        );
    }

    lifecycle.reset_all(&grant).unwrap();
    assert!(store.load().unwrap().is_empty());
    for path in stored {
        assert!(!Path::new(&path).exists());
    }
}

#[test]
fn test_legacy_document_upgrade() {
    let (_dir, config, store, receipts) = setup();
    fs::write(
        store.path(),
        r#"{
  "password": "9999",
  "users": [
    {"name": "Ali", "debt": 50000.0, "paid": false, "pending_cash": true,
     "pending_card": false, "receipt": "", "payment_time": "", "approved_by": ""}
  ]
}"#,
    )
    .unwrap();

    assert!(matches!(
        AuthGate::new(&store).login("1357"),
        Err(LedgerError::Unauthorized)
    ));
    let grant = AuthGate::new(&store).login("9999").unwrap();

    let doc = fs::read_to_string(store.path()).unwrap();
    assert!(!doc.contains("9999"));
    assert!(doc.contains("\"pendingCash\": true"));
    assert!(doc.contains("\"id\": 1"));

    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    let ali = find(&store, "ali");
    assert_eq!(
        lifecycle.approve_cash(&grant, ali.id).unwrap(),
        ApprovalOutcome::Approved
    );
    assert!(AuthGate::new(&store).login("9999").is_ok());
}

#[test]
fn test_save_load_twice_is_stable() {
    let (_dir, config, store, receipts) = setup();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    let grant = AuthGate::new(&store).login("1357").unwrap();
    lifecycle.add(&grant, "Ali", amount("12.75")).unwrap();
    lifecycle.add(&grant, "Sara", amount("0")).unwrap();
    lifecycle.submit_cash(&find(&store, "sara")).unwrap();

    store.save(&store.load().unwrap()).unwrap();
    let first = fs::read(store.path()).unwrap();
    store.save(&store.load().unwrap()).unwrap();
    assert_eq!(fs::read(store.path()).unwrap(), first);
}

#[test]
fn test_reset_from_another_working_directory_removes_receipts() {
    let root = tempfile::Builder::new()
        .prefix("ledger-cwd")
        .tempdir_in(".")
        .unwrap();
    let relative = Path::new(root.path().file_name().unwrap()).join("data");
    let absolute = fs::canonicalize(root.path()).unwrap().join("data");
    let source = root.path().join("r.png");
    fs::write(&source, b"png").unwrap();

    let config = Config::in_dir(&relative);
    let store = config.ledger_store();
    let receipts = config.receipt_store();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    let grant = AuthGate::new(&store).login("1357").unwrap();
    lifecycle.add(&grant, "Sara", amount("20000")).unwrap();
    lifecycle.submit_card(&find(&store, "sara"), &source).unwrap();

    let config = Config::in_dir(&absolute);
    let store = config.ledger_store();
    let receipts = config.receipt_store();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    assert_eq!(lifecycle.reset_all(&grant).unwrap(), 1);
    assert_eq!(fs::read_dir(receipts.dir()).unwrap().count(), 0);
}

#[test]
fn test_high_precision_amount_survives_storage() {
    let (_dir, config, store, receipts) = setup();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
    let grant = AuthGate::new(&store).login("1357").unwrap();
    let typed = amount("123456789012345.67");
    lifecycle.add(&grant, "Ali", typed).unwrap();

    let ali = find(&store, "ali");
    assert_eq!(ali.amount_due, typed);
    assert_eq!(lifecycle.submit_cash(&ali).unwrap(), ClaimOutcome::Submitted);
    let doc = fs::read_to_string(store.path()).unwrap();
    assert!(doc.contains("\"amountDue\": 123456789012345.67"));
}
