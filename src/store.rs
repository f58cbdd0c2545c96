//! Whole-document persistence of the ledger.
//!
//! Every mutation is a read-modify-write of the full document. [`LedgerStore::update`]
//! wraps that cycle: it is serialized against every other update in the
//! process, and refuses to write if the on-disk revision moved since the load.
//! The check and the final rename are not atomic across processes, so a
//! writer in another process can still slip in between them.

use crate::auth::hash_secret;
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;

/// Held for the whole of every [`LedgerStore::update`], whichever store runs it.
static UPDATE_LOCK: Mutex<()> = Mutex::new(());

pub struct LedgerStore {
    path: PathBuf,
    default_secret: String,
}

#[derive(Deserialize)]
struct RevisionOnly {
    #[serde(default)]
    revision: u64,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>, default_secret: &str) -> Self {
        LedgerStore {
            path: path.into(),
            default_secret: default_secret.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the ledger, creating and persisting a fresh one if the file
    /// does not exist yet.
    pub fn load(&self) -> Result<Ledger> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let ledger = Ledger::new(hash_secret(&self.default_secret)?);
                self.save(&ledger)?;
                info!("Created new ledger at {}", self.path.display());
                return Ok(ledger);
            }
            Err(e) => return Err(e.into()),
        };

        let mut ledger: Ledger = serde_json::from_slice(&bytes).map_err(|source| {
            LedgerError::StorageCorruption {
                path: self.path.clone(),
                source,
            }
        })?;
        if ledger.assign_missing_ids() {
            debug!("Assigned ids to records in {}", self.path.display());
        }
        Ok(ledger)
    }

    /// Overwrites the document with `ledger`.
    ///
    /// Written to a temporary file next to the target and renamed into place,
    /// so readers see either the old or the new document.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, ledger).map_err(io::Error::from)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Runs one load-mutate-save cycle.
    ///
    /// If `f` fails, or leaves the ledger unchanged, nothing is written. `f`
    /// must not start another update.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T>,
    {
        let _guard = UPDATE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let original = self.load()?;
        let mut ledger = original.clone();
        let out = f(&mut ledger)?;

        if ledger == original {
            debug!("Update left ledger unchanged, skipping write");
            return Ok(out);
        }

        let found = self.disk_revision()?;
        if found != original.revision() {
            return Err(LedgerError::Conflict {
                expected: original.revision(),
                found,
            });
        }

        ledger.bump_revision();
        self.save(&ledger)?;
        debug!("Saved ledger revision {}", ledger.revision());
        Ok(out)
    }

    fn disk_revision(&self) -> Result<u64> {
        let bytes = fs::read(&self.path)?;
        let doc: RevisionOnly =
            serde_json::from_slice(&bytes).map_err(|source| LedgerError::StorageCorruption {
                path: self.path.clone(),
                source,
            })?;
        Ok(doc.revision)
    }
}
