//! Authenticated sessions.
//!
//! A `Session` exists only after a successful login and is consumed by
//! `logout`. Holding one is what "authenticated" means; there is no global
//! session state.

use crate::{CredentialStore, Error, Ledger, NewEntry, Result, WorkoutEntry};
use std::path::Path;

/// A logged-in user together with their ledger
#[derive(Debug)]
pub struct Session {
    username: String,
    ledger: Ledger,
}

impl Session {
    /// Authenticate against `store` and open the user's ledger in `data_dir`
    pub fn login(
        store: &CredentialStore,
        data_dir: &Path,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        if !store.authenticate(username, password) {
            tracing::info!("Rejected login for '{}'", username);
            return Err(Error::InvalidCredentials);
        }

        let ledger = Ledger::load(data_dir, username)?;
        tracing::info!("'{}' logged in ({} entries)", username, ledger.len());

        Ok(Self {
            username: username.to_string(),
            ledger,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Append a set to this user's ledger
    pub fn log_entry(&mut self, entry: NewEntry) -> Result<&WorkoutEntry> {
        self.ledger.append(entry)
    }

    /// End the session, returning the username that was logged in
    pub fn logout(self) -> String {
        tracing::info!("'{}' logged out", self.username);
        self.username
    }
}
