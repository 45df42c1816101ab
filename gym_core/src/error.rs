//! Error types for the gym_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gym_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Login attempted with an unknown username or a wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Operation needs a logged-in session
    #[error("Please log in to access the app.")]
    NotAuthenticated,

    /// Registration collided with an existing account
    #[error("Username '{0}' already exists. Please choose a different username.")]
    UsernameTaken(String),

    /// Username cannot be used as an account name
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Input rejected at the boundary (weight, reps, dates, months)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Durable storage could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Errors the user can recover from by retrying with different input.
    ///
    /// Everything else is fatal to the operation that raised it.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::InvalidCredentials
                | Error::NotAuthenticated
                | Error::UsernameTaken(_)
                | Error::InvalidUsername(_)
                | Error::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(Error::InvalidCredentials.is_user_facing());
        assert!(Error::UsernameTaken("bob".into()).is_user_facing());
        assert!(Error::InvalidInput("reps".into()).is_user_facing());

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        assert!(!Error::from(io_err).is_user_facing());
        assert!(!Error::Config("bad".into()).is_user_facing());
    }

    #[test]
    fn test_io_error_reports_storage_unavailable() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::from(io_err);
        assert!(err.to_string().starts_with("Storage unavailable"));
    }
}
