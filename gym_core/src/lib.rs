#![forbid(unsafe_code)]

//! Core domain model and business logic for the Gym Tracker.
//!
//! This crate provides:
//! - Domain types (workout entries, accounts)
//! - 1RM estimation
//! - Persistence (credential table, per-user CSV ledger)
//! - Explicit login sessions
//! - Reporting queries for history, progress and calendar views

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod one_rep_max;
pub mod storage;
pub mod credentials;
pub mod ledger;
pub mod session;
pub mod reports;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use one_rep_max::estimate_one_rep_max;
pub use credentials::{hash_password, CredentialStore};
pub use ledger::{ledger_path, Ledger};
pub use session::Session;
