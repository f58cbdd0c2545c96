//! Manager authentication against the ledger's stored secret.
//!
//! Secrets are stored as Argon2id PHC strings. A document still carrying a
//! plaintext secret is accepted once and re-hashed on the first successful
//! login.

use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::store::LedgerStore;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::{info, warn};

/// Minimum length of a manager secret, in characters.
pub const MIN_SECRET_LEN: usize = 4;

/// Proof that the caller passed manager verification.
///
/// Only [`AuthGate::login`] creates one; every manager-only operation takes
/// a reference to it.
#[derive(Debug)]
pub struct ManagerGrant {
    _private: (),
}

/// Hash a secret using Argon2id.
pub fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LedgerError::SecretHash(format!("failed to hash secret: {e}")))
}

/// Returns `true` if the stored secret is not yet a PHC hash.
pub fn is_legacy_plaintext(ledger: &Ledger) -> bool {
    PasswordHash::new(ledger.secret()).is_err()
}

/// Checks a candidate secret against the ledger.
pub fn verify(secret: &str, ledger: &Ledger) -> Result<bool> {
    match PasswordHash::new(ledger.secret()) {
        Ok(parsed) => Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()),
        Err(_) => Ok(secret == ledger.secret()),
    }
}

/// Replaces the ledger's secret.
///
/// The new secret is trimmed; fewer than [`MIN_SECRET_LEN`] characters is a
/// validation failure.
pub fn rotate(new_secret: &str, mut ledger: Ledger) -> Result<Ledger> {
    let trimmed = new_secret.trim();
    if trimmed.chars().count() < MIN_SECRET_LEN {
        return Err(LedgerError::Validation(format!(
            "secret must be at least {} characters",
            MIN_SECRET_LEN
        )));
    }
    ledger.set_secret(hash_secret(trimmed)?);
    Ok(ledger)
}

/// Gatekeeper for manager-only operations.
pub struct AuthGate<'a> {
    store: &'a LedgerStore,
}

impl<'a> AuthGate<'a> {
    pub fn new(store: &'a LedgerStore) -> Self {
        AuthGate { store }
    }

    /// Verifies the secret against a freshly loaded ledger.
    pub fn login(&self, secret: &str) -> Result<ManagerGrant> {
        let ledger = self.store.load()?;
        if !verify(secret, &ledger)? {
            warn!("Manager login rejected");
            return Err(LedgerError::Unauthorized);
        }

        if is_legacy_plaintext(&ledger) {
            let hashed = hash_secret(secret)?;
            self.store.update(|ledger| {
                if is_legacy_plaintext(ledger) {
                    ledger.set_secret(hashed);
                }
                Ok(())
            })?;
            info!("Upgraded plaintext manager secret to Argon2 hash");
        }

        Ok(ManagerGrant { _private: () })
    }

    /// Rotates the manager secret.
    pub fn change_secret(&self, _grant: &ManagerGrant, new_secret: &str) -> Result<()> {
        self.store.update(|ledger| {
            *ledger = rotate(new_secret, ledger.clone())?;
            Ok(())
        })?;
        info!("Manager secret changed");
        Ok(())
    }
}
