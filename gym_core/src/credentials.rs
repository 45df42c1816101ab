//! Credential store: username -> password hash.
//!
//! The table is a flat JSON object persisted at a single path. It is read
//! once when opened and rewritten in full on every registration.
//!
//! Passwords are hashed with one unsalted SHA-256 pass. That is weak storage
//! and kept only so tables written by earlier versions stay valid; swapping
//! in a salted slow hash only needs `hash_password` and `verify` to change.

use crate::storage::{self, FileLock};
use crate::{Error, Result, UserAccount};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Account seeded into a fresh credential table
pub const BOOTSTRAP_USERNAME: &str = "admin";
const BOOTSTRAP_PASSWORD: &str = "admin";

/// File name of the credential table inside the data directory
pub const CREDENTIALS_FILE: &str = "users.json";

/// Hex-encoded SHA-256 of the raw password bytes
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check that a username can name an account and its ledger file
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(Error::InvalidUsername("username cannot be empty".into()));
    }
    if username.trim() != username {
        return Err(Error::InvalidUsername(
            "username cannot start or end with whitespace".into(),
        ));
    }
    if username == "." || username == ".." {
        return Err(Error::InvalidUsername(format!("'{}' is reserved", username)));
    }
    let has_separator = username.contains(|c: char| c == '/' || c == '\\');
    if has_separator || username.chars().any(char::is_control) {
        return Err(Error::InvalidUsername(
            "username cannot contain path separators or control characters".into(),
        ));
    }
    Ok(())
}

/// Persistent mapping of usernames to password hashes
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    users: BTreeMap<String, String>,
}

impl CredentialStore {
    /// Open the credential table in `data_dir`
    pub fn open_in(data_dir: &Path) -> Result<Self> {
        Self::open(data_dir.join(CREDENTIALS_FILE))
    }

    /// Open the credential table at `path`
    ///
    /// A missing table is created on the spot, seeded with the bootstrap
    /// account, and written to disk before loading.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            let mut users = BTreeMap::new();
            users.insert(
                BOOTSTRAP_USERNAME.to_string(),
                hash_password(BOOTSTRAP_PASSWORD),
            );
            let store = Self { path, users };
            store.save()?;
            tracing::info!(
                "Seeded credential table {:?} with default account '{}'",
                store.path,
                BOOTSTRAP_USERNAME
            );
            return Ok(store);
        }

        let contents = {
            let _lock = FileLock::shared(&path)?;
            std::fs::read_to_string(&path)?
        };
        let users: BTreeMap<String, String> = serde_json::from_str(&contents)?;

        tracing::debug!("Loaded {} accounts from {:?}", users.len(), path);
        Ok(Self { path, users })
    }

    /// True iff `username` exists and `password` hashes to its stored hash
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(stored) => verify(password, stored),
            None => false,
        }
    }

    /// Create a new account and persist the full table
    ///
    /// Fails with `UsernameTaken` if the account exists; the stored hash is
    /// left untouched in that case.
    pub fn register(&mut self, username: &str, password: &str) -> Result<()> {
        validate_username(username)?;

        if self.users.contains_key(username) {
            return Err(Error::UsernameTaken(username.to_string()));
        }

        self.users
            .insert(username.to_string(), hash_password(password));

        if let Err(e) = self.save() {
            // Keep memory consistent with disk
            self.users.remove(username);
            return Err(e);
        }

        tracing::info!("Registered account '{}'", username);
        Ok(())
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn account(&self, username: &str) -> Option<UserAccount> {
        self.users.get(username).map(|hash| UserAccount {
            username: username.to_string(),
            password_hash: hash.clone(),
        })
    }

    /// Registered usernames in sorted order
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        storage::write_atomic(&self.path, |writer| {
            serde_json::to_writer(&mut *writer, &self.users)?;
            Ok(())
        })
    }
}

fn verify(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, CredentialStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open_in(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_hash_password_is_sha256_hex() {
        assert_eq!(
            hash_password("admin"),
            "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
        );
        assert_eq!(hash_password("secret").len(), 64);
    }

    #[test]
    fn test_open_seeds_bootstrap_account() {
        let (temp_dir, store) = open_temp();

        let path = temp_dir.path().join(CREDENTIALS_FILE);
        assert!(path.exists());
        assert_eq!(store.len(), 1);
        assert!(store.authenticate("admin", "admin"));

        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.get("admin"), Some(&hash_password("admin")));
    }

    #[test]
    fn test_open_does_not_reseed_existing_table() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CREDENTIALS_FILE);
        let existing = format!(r#"{{"carol":"{}"}}"#, hash_password("pw"));
        std::fs::write(&path, existing).unwrap();

        let store = CredentialStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.contains("admin"));
        assert!(store.authenticate("carol", "pw"));
    }

    #[test]
    fn test_authenticate_truth_table() {
        let (_temp_dir, mut store) = open_temp();
        store.register("alice", "wonderland").unwrap();

        assert!(store.authenticate("alice", "wonderland"));
        assert!(!store.authenticate("alice", "Wonderland"));
        assert!(!store.authenticate("alice", ""));
        assert!(!store.authenticate("bob", "wonderland"));
        assert!(store.authenticate("admin", "admin"));
        assert!(!store.authenticate("admin", "wonderland"));
    }

    #[test]
    fn test_register_twice_keeps_first_hash() {
        let (_temp_dir, mut store) = open_temp();
        store.register("alice", "first").unwrap();
        let before = store.account("alice").unwrap();

        match store.register("alice", "second") {
            Err(Error::UsernameTaken(name)) => assert_eq!(name, "alice"),
            other => panic!("Expected UsernameTaken, got {:?}", other),
        }

        assert_eq!(store.account("alice").unwrap(), before);
        assert!(store.authenticate("alice", "first"));
        assert!(!store.authenticate("alice", "second"));
    }

    #[test]
    fn test_register_bootstrap_name_is_taken() {
        let (_temp_dir, mut store) = open_temp();
        assert!(matches!(
            store.register("admin", "x"),
            Err(Error::UsernameTaken(_))
        ));
    }

    #[test]
    fn test_registration_persists_full_table() {
        let (temp_dir, mut store) = open_temp();
        store.register("alice", "a").unwrap();
        store.register("bob", "b").unwrap();

        let reopened = CredentialStore::open_in(temp_dir.path()).unwrap();
        let names: Vec<_> = reopened.usernames().collect();
        assert_eq!(names, vec!["admin", "alice", "bob"]);
        assert!(reopened.authenticate("bob", "b"));
    }

    #[test]
    fn test_invalid_usernames_rejected() {
        let (_temp_dir, mut store) = open_temp();
        for bad in ["", " alice", "..", "a/b", "a\\b", "tab\there"] {
            assert!(
                matches!(store.register(bad, "pw"), Err(Error::InvalidUsername(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_corrupted_table_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CREDENTIALS_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(CredentialStore::open(&path), Err(Error::Json(_))));
    }
}
