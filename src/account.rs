//! The account entity and the narrow views around it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A persisted account: identity, credential, and verification/abuse state.
///
/// A verification or reset code is always paired with its expiry; the two
/// are set and cleared together via [`AccountPatch`].
#[derive(Clone, Debug)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_email_verified: bool,
    pub email_verification_code: Option<String>,
    pub email_verification_expires: Option<DateTime<Utc>>,
    pub password_reset_code: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub refresh_token_expires: Option<DateTime<Utc>>,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Whether the lock is still in force at `now`. A `locked_until` in the
    /// past counts as unlocked; the engine clears the stale fields lazily.
    #[must_use]
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    #[must_use]
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_email_verified: self.is_email_verified,
            is_active: self.is_active,
        }
    }

    pub(crate) fn apply(&mut self, patch: AccountPatch, now: DateTime<Utc>) {
        if let Some(hash) = patch.password_hash {
            self.password_hash = hash;
        }
        if let Some(verified) = patch.is_email_verified {
            self.is_email_verified = verified;
        }
        if let Some(verification) = patch.email_verification {
            match verification {
                Some((code, expires)) => {
                    self.email_verification_code = Some(code);
                    self.email_verification_expires = Some(expires);
                }
                None => {
                    self.email_verification_code = None;
                    self.email_verification_expires = None;
                }
            }
        }
        if let Some(reset) = patch.password_reset {
            match reset {
                Some((code, expires)) => {
                    self.password_reset_code = Some(code);
                    self.password_reset_expires = Some(expires);
                }
                None => {
                    self.password_reset_code = None;
                    self.password_reset_expires = None;
                }
            }
        }
        if let Some(session) = patch.refresh_token {
            match session {
                Some((token, expires)) => {
                    self.refresh_token = Some(token);
                    self.refresh_token_expires = Some(expires);
                }
                None => {
                    self.refresh_token = None;
                    self.refresh_token_expires = None;
                }
            }
        }
        if let Some(attempts) = patch.failed_login_attempts {
            self.failed_login_attempts = attempts;
        }
        if let Some(locked_until) = patch.locked_until {
            self.locked_until = locked_until;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        self.updated_at = now;
    }
}

/// Fields needed to create an account. The store assigns id and timestamps;
/// new accounts always start unverified, unlocked, and active.
#[derive(Clone, Debug)]
pub struct AccountDraft {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email_verification_code: String,
    pub email_verification_expires: DateTime<Utc>,
}

/// The safe-to-return view of an account: never the hash, codes, or tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_email_verified: bool,
    pub is_active: bool,
}

/// Partial update applied atomically to a single account.
///
/// Outer `Option` means "leave untouched"; the inner `Option` on nullable
/// fields means "set" vs "clear". Codes travel with their expiry in one
/// tuple so neither can be written without the other.
#[derive(Clone, Debug, Default)]
pub struct AccountPatch {
    pub password_hash: Option<String>,
    pub is_email_verified: Option<bool>,
    pub email_verification: Option<Option<(String, DateTime<Utc>)>>,
    pub password_reset: Option<Option<(String, DateTime<Utc>)>>,
    pub refresh_token: Option<Option<(String, DateTime<Utc>)>>,
    pub failed_login_attempts: Option<i32>,
    pub locked_until: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

impl AccountPatch {
    /// Replace the outstanding verification code; any prior one stops
    /// matching immediately.
    #[must_use]
    pub fn verification_code(code: String, expires: DateTime<Utc>) -> Self {
        Self {
            email_verification: Some(Some((code, expires))),
            ..Self::default()
        }
    }

    /// Mark the email verified and consume the code. Irreversible.
    #[must_use]
    pub fn email_verified() -> Self {
        Self {
            is_email_verified: Some(true),
            email_verification: Some(None),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reset_code(code: String, expires: DateTime<Utc>) -> Self {
        Self {
            password_reset: Some(Some((code, expires))),
            ..Self::default()
        }
    }

    /// Swap in the new credential and consume the reset code in one write.
    #[must_use]
    pub fn password_reset_applied(password_hash: String) -> Self {
        Self {
            password_hash: Some(password_hash),
            password_reset: Some(None),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn refresh_session(token: String, expires: DateTime<Utc>) -> Self {
        Self {
            refresh_token: Some(Some((token, expires))),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn session_cleared() -> Self {
        Self {
            refresh_token: Some(None),
            ..Self::default()
        }
    }

    /// Record a failed login attempt, optionally tripping the lock.
    #[must_use]
    pub fn failed_attempt(attempts: i32, locked_until: Option<DateTime<Utc>>) -> Self {
        Self {
            failed_login_attempts: Some(attempts),
            locked_until: Some(locked_until),
            ..Self::default()
        }
    }

    /// Clear the counter and the lock together.
    #[must_use]
    pub fn attempts_cleared() -> Self {
        Self {
            failed_login_attempts: Some(0),
            locked_until: Some(None),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn deactivated() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }
}
