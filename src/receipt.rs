//! Managed storage for card payment receipts.
//!
//! Receipts are copied into a dedicated directory as
//! `{timestamp}_{original name}`. There is no index; a file is referenced only
//! by the `receiptPath` of its record.

use crate::error::{LedgerError, Result};
use chrono::Local;
use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Opens a stored receipt for a human to look at.
pub trait ReceiptViewer {
    fn open(&self, path: &Path) -> io::Result<()>;
}

pub struct ReceiptStore {
    dir: PathBuf,
}

impl ReceiptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ReceiptStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copies `source` into managed storage and returns the stored path,
    /// which is always absolute.
    ///
    /// If another receipt already took the timestamped name in the same
    /// second, a counter is inserted after the timestamp.
    pub fn attach(&self, source: &Path) -> Result<PathBuf> {
        let copy_failure = |e: io::Error| LedgerError::Copy {
            path: source.to_path_buf(),
            source: e,
        };

        let mut input = File::open(source).map_err(copy_failure)?;
        if !input.metadata().map_err(copy_failure)?.is_file() {
            return Err(copy_failure(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let base = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                copy_failure(io::Error::new(io::ErrorKind::InvalidInput, "no file name"))
            })?;

        fs::create_dir_all(&self.dir).map_err(copy_failure)?;
        let dir = fs::canonicalize(&self.dir).map_err(copy_failure)?;
        let stamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let (dest, mut output) = create_unique(&dir, &stamp, &base).map_err(copy_failure)?;

        if let Err(e) = io::copy(&mut input, &mut output) {
            drop(output);
            let _ = fs::remove_file(&dest);
            return Err(copy_failure(e));
        }

        debug!("Stored receipt {} as {}", source.display(), dest.display());
        Ok(dest)
    }

    /// Deletes a stored receipt. Missing files and paths outside the managed
    /// directory are left alone.
    pub fn release(&self, stored: &str) {
        if stored.is_empty() {
            return;
        }
        let path = match self.locate(stored) {
            Some(path) => path,
            None => {
                debug!("Receipt {} already gone", stored);
                return;
            }
        };
        if !self.is_managed(&path) {
            warn!("Not deleting {}: outside receipt directory", stored);
            return;
        }
        match fs::remove_file(&path) {
            Ok(()) => debug!("Released receipt {}", stored),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to delete receipt {}: {}", stored, e),
        }
    }

    /// Hands a stored receipt to the viewer.
    pub fn open(&self, stored: &str, viewer: &dyn ReceiptViewer) -> Result<()> {
        let path = match self.locate(stored) {
            Some(path) => path,
            None => return Err(LedgerError::ReceiptMissing(PathBuf::from(stored))),
        };
        viewer.open(&path)?;
        Ok(())
    }

    /// Finds a stored receipt on disk. A relative path recorded from another
    /// working directory is looked up by file name in the receipt directory.
    fn locate(&self, stored: &str) -> Option<PathBuf> {
        let path = Path::new(stored);
        if stored.is_empty() {
            return None;
        }
        if path.is_absolute() && path.exists() {
            return Some(path.to_path_buf());
        }
        let in_dir = self.dir.join(path.file_name()?);
        if in_dir.exists() {
            Some(in_dir)
        } else if path.exists() {
            Some(path.to_path_buf())
        } else {
            None
        }
    }

    fn is_managed(&self, path: &Path) -> bool {
        let parent = match path.parent().map(fs::canonicalize) {
            Some(Ok(parent)) => parent,
            _ => return false,
        };
        match fs::canonicalize(&self.dir) {
            Ok(dir) => parent == dir,
            Err(_) => false,
        }
    }
}

fn create_unique(dir: &Path, stamp: &str, base: &str) -> io::Result<(PathBuf, File)> {
    let mut counter = 0u32;
    loop {
        let name = if counter == 0 {
            format!("{}_{}", stamp, base)
        } else {
            format!("{}_{}_{}", stamp, counter, base)
        };
        let candidate = dir.join(name);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(e),
        }
    }
}
