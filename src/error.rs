//! Error taxonomy for the lifecycle engine.
//!
//! Callers pattern-match on the kind; messages are presentational only and
//! never part of the contract. Lookup misses are deliberately coarse:
//! "invalid or expired" never reveals which of the two it was.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input caught before any state is touched.
    #[error("{0}")]
    Validation(String),

    #[error("email already registered")]
    DuplicateEmail,

    /// Wrong password or unknown email; indistinguishable by design.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Too many failed attempts; carries the unlock time.
    #[error("account temporarily locked until {until}")]
    AccountLocked { until: DateTime<Utc> },

    #[error("please verify your email before logging in")]
    EmailNotVerified,

    #[error("account is deactivated")]
    AccountDeactivated,

    #[error("refresh token is required")]
    MissingToken,

    #[error("invalid or expired refresh token")]
    InvalidOrExpiredToken,

    #[error("invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("account not found")]
    NotFound,

    #[error("email is already verified")]
    AlreadyVerified,

    /// Infrastructure failure (store, hashing, signing). Opaque to callers;
    /// the detail stays in logs.
    #[error("service unavailable")]
    Unavailable(#[source] anyhow::Error),
}
