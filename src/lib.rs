//! # Debt Ledger
//!
//! Tracks what each member of a group owes and coordinates settlement between
//! debtors and a single manager. A debtor claims to have paid, in cash or by
//! attaching a card receipt; only the manager's approval settles the debt.
//!
//! ## Design Principles
//!
//! - **Exclusive states**: a record is unpaid, has one pending claim, or is
//!   settled; settlement is terminal
//! - **Stable identity**: records carry an id assigned at creation, and a
//!   displayed record is re-resolved before any claim is applied
//! - **Whole-document persistence**: every mutation is one checked
//!   load-mutate-save cycle of the JSON ledger
//! - **Hashed secret**: the manager secret is stored as an Argon2 hash
//!
//! ## Example
//!
//! ```no_run
//! use debt_ledger::{AuthGate, Config, DebtorSnapshot, PaymentLifecycle};
//! use std::str::FromStr;
//!
//! let config = Config::in_dir("./ledger-data");
//! let store = config.ledger_store();
//! let receipts = config.receipt_store();
//! let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);
//!
//! let grant = AuthGate::new(&store).login("1357").unwrap();
//! let id = lifecycle
//!     .add(&grant, "Ali", debt_ledger::Amount::from_str("50000").unwrap())
//!     .unwrap();
//!
//! let ledger = store.load().unwrap();
//! let snapshot = DebtorSnapshot::from(ledger.get(id).unwrap());
//! lifecycle.submit_cash(&snapshot).unwrap();
//! lifecycle.approve_cash(&grant, id).unwrap();
//! ```

pub mod amount;
pub mod auth;
pub mod config;
pub mod debtor;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod receipt;
pub mod report;
pub mod resolver;
pub mod store;

pub use amount::Amount;
pub use auth::{AuthGate, ManagerGrant};
pub use config::Config;
pub use debtor::{DebtorId, DebtorRecord, PaymentState, SettlementMethod};
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use lifecycle::{ApprovalOutcome, ClaimOutcome, PaymentLifecycle};
pub use receipt::{ReceiptStore, ReceiptViewer};
pub use resolver::DebtorSnapshot;
pub use store::LedgerStore;
