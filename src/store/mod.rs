//! Persistence contract for the lifecycle engine.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::account::{Account, AccountDraft, AccountPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("account not found")]
    NotFound,

    /// Connection loss, timeouts, and other infrastructure failures.
    #[error("account store unavailable")]
    Unavailable(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The narrow persistence surface the engine needs.
///
/// Every call is atomic at single-account granularity; the store owns its
/// own locking and transaction discipline, and the engine never holds a
/// lock across calls. Expiry comparisons are strictly greater-than the
/// current time: a code or token expiring exactly now no longer matches.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;

    /// Matches only an unexpired refresh token on an active account.
    async fn find_by_active_refresh_token(&self, token: &str) -> StoreResult<Option<Account>>;

    /// Matches only while the verification expiry is in the future.
    async fn find_by_verification_code(&self, code: &str) -> StoreResult<Option<Account>>;

    /// Matches only while the reset expiry is in the future.
    async fn find_by_reset_code(&self, code: &str) -> StoreResult<Option<Account>>;

    /// Create a new account. Email uniqueness is enforced by the store
    /// itself, not by a prior read: two concurrent registrations with the
    /// same email resolve to exactly one success and one `DuplicateEmail`.
    async fn create(&self, draft: AccountDraft) -> StoreResult<Account>;

    /// Apply a partial update to one account in a single atomic write.
    async fn update(&self, id: Uuid, patch: AccountPatch) -> StoreResult<()>;
}
