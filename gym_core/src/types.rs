//! Core domain types for the Gym Tracker.
//!
//! This module defines:
//! - Accounts held by the credential store
//! - Workout entries as submitted and as recorded in the ledger

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Account Types
// ============================================================================

/// A registered user as persisted by the credential store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAccount {
    pub username: String,
    /// Lowercase hex SHA-256 digest of the password
    pub password_hash: String,
}

// ============================================================================
// Workout Types
// ============================================================================

/// A workout set as submitted by the user, before the 1RM is derived
#[derive(Clone, Debug, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
}

impl NewEntry {
    pub fn new(date: NaiveDate, exercise: impl Into<String>, weight: f64, reps: u32) -> Self {
        Self {
            date,
            exercise: exercise.into(),
            weight,
            reps,
        }
    }

    /// Input boundary checks: weight must be a finite value >= 0 and reps >= 1.
    ///
    /// The ledger itself never calls this; callers validate before appending.
    pub fn validate(&self) -> Result<()> {
        validate_set(self.weight, self.reps)
    }
}

/// Check a weight/reps pair: weight finite and >= 0, reps >= 1
pub fn validate_set(weight: f64, reps: u32) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(Error::InvalidInput(format!(
            "weight must be a number >= 0 (got {})",
            weight
        )));
    }
    if reps < 1 {
        return Err(Error::InvalidInput("reps must be at least 1".into()));
    }
    Ok(())
}

/// A recorded workout set
///
/// `one_rep_max` is fixed when the entry is created and travels with the
/// row; it is never recomputed on read.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutEntry {
    pub date: NaiveDate,
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    pub one_rep_max: f64,
}

impl From<NewEntry> for WorkoutEntry {
    fn from(entry: NewEntry) -> Self {
        let one_rep_max = crate::estimate_one_rep_max(entry.weight, entry.reps);
        WorkoutEntry {
            date: entry.date,
            exercise: entry.exercise,
            weight: entry.weight,
            reps: entry.reps,
            one_rep_max,
        }
    }
}
