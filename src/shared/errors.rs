//! Error handling for the application

use thiserror::Error;

use super::types::ErrorKind;

/// Reasons a single swap attempt can fail
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttemptError {
    #[error("A swap attempt is already in progress")]
    AlreadyInProgress,

    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Insufficient balance: {0} USD")]
    InsufficientBalance(String),

    #[error("Swap amount too small: {0} USD (minimum {1} USD)")]
    AmountTooSmall(String, String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("User rejected the transaction: {0}")]
    UserRejected(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Swap failed: {0}")]
    Unknown(String),
}

impl AttemptError {
    /// Closed error kind used downstream of the executor
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttemptError::AlreadyInProgress => ErrorKind::AlreadyInProgress,
            AttemptError::WalletUnavailable(_) => ErrorKind::WalletUnavailable,
            AttemptError::InsufficientBalance(_) => ErrorKind::InsufficientBalance,
            AttemptError::AmountTooSmall(..) => ErrorKind::AmountTooSmall,
            AttemptError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            AttemptError::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            AttemptError::UserRejected(_) => ErrorKind::UserRejected,
            AttemptError::NetworkError(_) => ErrorKind::NetworkError,
            AttemptError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Classify an untyped swap router failure by its message.
    ///
    /// This is the only place where error text is inspected; everything
    /// downstream works with [`ErrorKind`].
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        let message = message.to_string();

        if lowered.contains("insufficient") {
            AttemptError::InsufficientFunds(message)
        } else if lowered.contains("user rejected") || lowered.contains("user denied") {
            AttemptError::UserRejected(message)
        } else if lowered.contains("network") || lowered.contains("fetch") {
            AttemptError::NetworkError(message)
        } else {
            AttemptError::Unknown(message)
        }
    }
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}
