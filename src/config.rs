//! Storage locations and fixed settings, passed explicitly to each component.

use crate::receipt::ReceiptStore;
use crate::store::LedgerStore;
use std::path::{Path, PathBuf};

/// Secret a freshly created ledger starts with.
pub const DEFAULT_SECRET: &str = "1357";

/// Role label recorded as the approver of a settlement.
pub const MANAGER_ROLE: &str = "manager";

/// File name of the ledger document inside the data directory.
pub const LEDGER_FILE: &str = "data.json";

/// Directory name for stored receipts inside the data directory.
pub const RECEIPT_DIR: &str = "receipts";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    pub receipt_dir: PathBuf,
    pub default_secret: String,
    pub approver: String,
}

impl Config {
    /// Standard layout rooted at `dir`: `dir/data.json` and `dir/receipts/`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Config {
            data_file: dir.join(LEDGER_FILE),
            receipt_dir: dir.join(RECEIPT_DIR),
            default_secret: DEFAULT_SECRET.to_string(),
            approver: MANAGER_ROLE.to_string(),
        }
    }

    pub fn ledger_store(&self) -> LedgerStore {
        LedgerStore::new(&self.data_file, &self.default_secret)
    }

    pub fn receipt_store(&self) -> ReceiptStore {
        ReceiptStore::new(&self.receipt_dir)
    }
}
