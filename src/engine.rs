//! The account lifecycle engine.
//!
//! Orchestrates registration, credential validation, token issuance, email
//! verification, password reset, and lockout against the store, hasher,
//! code generator, token issuer, and mail/audit collaborators. All wiring
//! is explicit constructor injection.

use std::sync::Arc;

use chrono::{Duration, Utc};
use regex::Regex;
use serde_json::json;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::account::{Account, AccountDraft, AccountPatch, PublicProfile};
use crate::audit::{AuditEvent, AuditRecorder};
use crate::code;
use crate::config::AuthConfig;
use crate::email::EmailSender;
use crate::error::AuthError;
use crate::password;
use crate::store::{AccountStore, StoreError};
use crate::token::TokenIssuer;

pub const REGISTER_ACK: &str =
    "Registration successful. Please check your email for verification code.";
/// Returned whether or not the email exists; the two branches must stay
/// byte-identical to resist account enumeration.
pub const FORGOT_PASSWORD_ACK: &str = "If the email exists, a password reset code has been sent.";
pub const RESET_PASSWORD_ACK: &str =
    "Password reset successfully. You can now login with your new password.";
pub const VERIFY_EMAIL_ACK: &str =
    "Email verified successfully. You can now login to your account.";
pub const RESEND_VERIFICATION_ACK: &str =
    "Verification code sent successfully. Please check your email.";

const MIN_PASSWORD_CHARS: usize = 8;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_code_shape(code: &str) -> Result<(), AuthError> {
    if !code::valid_code(code) {
        return Err(AuthError::Validation(
            "code must be exactly 6 digits".to_string(),
        ));
    }
    Ok(())
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::NotFound => Self::NotFound,
            StoreError::Unavailable(inner) => Self::Unavailable(inner),
        }
    }
}

/// Ack and public profile returned from registration.
#[derive(Clone, Debug)]
pub struct Registration {
    pub message: String,
    pub profile: PublicProfile,
}

/// Tokens and profile returned from a successful login.
#[derive(Clone, Debug)]
pub struct LoginSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
    pub profile: PublicProfile,
}

/// Fresh access token returned from the refresh flow.
#[derive(Clone, Debug)]
pub struct RefreshedSession {
    pub access_token: String,
    pub expires_in: i64,
}

pub struct AccountEngine {
    config: AuthConfig,
    store: Arc<dyn AccountStore>,
    mail: Arc<dyn EmailSender>,
    audit: Arc<dyn AuditRecorder>,
    tokens: TokenIssuer,
}

impl AccountEngine {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn AccountStore>,
        mail: Arc<dyn EmailSender>,
        audit: Arc<dyn AuditRecorder>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            config,
            store,
            mail,
            audit,
            tokens,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Create a new, unverified account and dispatch its verification code.
    ///
    /// The mail send is best-effort: a failure is logged, never fatal, since
    /// the account row has already committed.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed input, `DuplicateEmail` if the address is
    /// taken, `Unavailable` on infrastructure failure.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Registration, AuthError> {
        let email = email.trim();
        if !valid_email(email) {
            return Err(AuthError::Validation("invalid email address".to_string()));
        }
        validate_password(password)?;
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(AuthError::Validation(
                "first and last name are required".to_string(),
            ));
        }

        let password_hash = password::hash(password, self.config.hash_cost())?;
        let verification_code = code::generate();
        let expires = code::expiry(Utc::now(), self.config.code_ttl_seconds());

        let draft = AccountDraft {
            email: email.to_string(),
            password_hash,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email_verification_code: verification_code.clone(),
            email_verification_expires: expires,
        };

        let account = match self.store.create(draft).await {
            Ok(account) => account,
            Err(err) => {
                self.record_audit(
                    AuditEvent::failed("REGISTER", "account", err.to_string())
                        .with_metadata(json!({ "email": email })),
                );
                return Err(err.into());
            }
        };

        if let Err(err) = self.mail.send_verification(&account.email, &verification_code) {
            error!("failed to send verification email: {err}");
        }

        self.record_audit(
            AuditEvent::success("REGISTER", "account")
                .with_account(account.id)
                .with_metadata(json!({ "email": account.email })),
        );

        Ok(Registration {
            message: REGISTER_ACK.to_string(),
            profile: account.public_profile(),
        })
    }

    /// Check a password against a stored credential, driving the lockout
    /// state machine.
    ///
    /// The lock is checked before the hash comparison, so a locked account
    /// never touches the hasher or the counter. A lapsed lock is cleared
    /// lazily here, resetting the counter to zero.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown email or wrong password (the two
    /// are indistinguishable by design), `AccountLocked`, `EmailNotVerified`,
    /// `AccountDeactivated`, or `Unavailable`.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn validate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Account, AuthError> {
        let email = email.trim();
        let Some(mut account) = self.store.find_by_email(email).await? else {
            // distinguishable internally, never in the response
            debug!("login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let now = Utc::now();
        if let Some(until) = account.locked_until {
            if account.is_locked(now) {
                return Err(AuthError::AccountLocked { until });
            }
            // lock window elapsed: lazy auto-unlock
            self.store
                .update(account.id, AccountPatch::attempts_cleared())
                .await?;
            account.failed_login_attempts = 0;
            account.locked_until = None;
        }

        if !account.is_email_verified {
            return Err(AuthError::EmailNotVerified);
        }
        if !account.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        if !password::verify(password, &account.password_hash)? {
            let attempts = account.failed_login_attempts + 1;
            let locked_until = if attempts >= self.config.lock_threshold() {
                Some(now + Duration::seconds(self.config.lock_duration_seconds()))
            } else {
                None
            };
            // Two racing failures may both write the same count; last-write-wins
            // only makes lockout marginally more lenient on the counter, never
            // on the lock itself.
            self.store
                .update(account.id, AccountPatch::failed_attempt(attempts, locked_until))
                .await?;
            self.record_audit(
                AuditEvent::failed("LOGIN", "auth", "invalid_password".to_string())
                    .with_account(account.id)
                    .with_metadata(json!({ "email": account.email })),
            );
            return Err(AuthError::InvalidCredentials);
        }

        if account.failed_login_attempts > 0 {
            self.store
                .update(account.id, AccountPatch::attempts_cleared())
                .await?;
            account.failed_login_attempts = 0;
        }

        Ok(account)
    }

    /// Issue access and refresh tokens for a validated account.
    ///
    /// The refresh token replaces any prior one: a single active refresh
    /// token per account, earlier ones stop matching immediately.
    #[instrument(skip_all, fields(account_id = %account.id))]
    pub async fn login(&self, account: &Account) -> Result<LoginSession, AuthError> {
        let access_token = self.tokens.issue_access_token(account.id, &account.email)?;
        let refresh_token = self.tokens.issue_refresh_token(account.id, &account.email)?;
        let refresh_expires = Utc::now() + Duration::seconds(self.tokens.refresh_ttl_seconds());

        if let Err(err) = self
            .store
            .update(
                account.id,
                AccountPatch::refresh_session(refresh_token.clone(), refresh_expires),
            )
            .await
        {
            self.record_audit(
                AuditEvent::failed("LOGIN", "auth", err.to_string()).with_account(account.id),
            );
            return Err(err.into());
        }

        self.record_audit(
            AuditEvent::success("LOGIN", "auth")
                .with_account(account.id)
                .with_metadata(json!({ "email": account.email })),
        );

        Ok(LoginSession {
            access_token,
            refresh_token,
            expires_in: self.tokens.access_ttl_seconds(),
            profile: account.public_profile(),
        })
    }

    /// Exchange a refresh token for a new access token. The refresh token
    /// itself is left unchanged.
    ///
    /// # Errors
    ///
    /// `MissingToken` for an empty input, `InvalidOrExpiredToken` when no
    /// active account holds the token.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedSession, AuthError> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let account = self
            .store
            .find_by_active_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        let access_token = self.tokens.issue_access_token(account.id, &account.email)?;
        Ok(RefreshedSession {
            access_token,
            expires_in: self.tokens.access_ttl_seconds(),
        })
    }

    /// Clear the refresh token. Idempotent: logging out twice, or for an
    /// account that no longer exists, is not an error.
    #[instrument(skip_all, fields(account_id = %account_id))]
    pub async fn logout(&self, account_id: Uuid) -> Result<(), AuthError> {
        match self
            .store
            .update(account_id, AccountPatch::session_cleared())
            .await
        {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Issue a password-reset code if the email is registered.
    ///
    /// The acknowledgment is identical whether or not the account exists;
    /// only the internal side effect differs.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, email: &str) -> Result<String, AuthError> {
        if let Some(account) = self.store.find_by_email(email.trim()).await? {
            let reset_code = code::generate();
            let expires = code::expiry(Utc::now(), self.config.code_ttl_seconds());
            self.store
                .update(
                    account.id,
                    AccountPatch::reset_code(reset_code.clone(), expires),
                )
                .await?;
            if let Err(err) = self.mail.send_password_reset(&account.email, &reset_code) {
                error!("failed to send password reset email: {err}");
            }
        } else {
            debug!("password reset requested for unknown email");
        }

        Ok(FORGOT_PASSWORD_ACK.to_string())
    }

    /// Replace the credential using an unexpired reset code. The code is
    /// consumed in the same write as the new hash. Does not log the user in.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed code or weak password,
    /// `InvalidOrExpiredCode` when the code does not match.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, reset_code: &str, new_password: &str) -> Result<String, AuthError> {
        validate_code_shape(reset_code)?;
        validate_password(new_password)?;

        let account = self
            .store
            .find_by_reset_code(reset_code)
            .await?
            .ok_or(AuthError::InvalidOrExpiredCode)?;

        let password_hash = password::hash(new_password, self.config.hash_cost())?;
        self.store
            .update(account.id, AccountPatch::password_reset_applied(password_hash))
            .await?;

        Ok(RESET_PASSWORD_ACK.to_string())
    }

    /// Consume an unexpired verification code and mark the email verified.
    /// The transition is irreversible; no un-verify operation exists.
    #[instrument(skip_all)]
    pub async fn verify_email(&self, verification_code: &str) -> Result<String, AuthError> {
        validate_code_shape(verification_code)?;

        let account = self
            .store
            .find_by_verification_code(verification_code)
            .await?
            .ok_or(AuthError::InvalidOrExpiredCode)?;

        self.store
            .update(account.id, AccountPatch::email_verified())
            .await?;

        Ok(VERIFY_EMAIL_ACK.to_string())
    }

    /// Issue a fresh verification code, invalidating the previous one even
    /// if it has not expired.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown email, `AlreadyVerified` when there is
    /// nothing left to verify.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn resend_verification(&self, email: &str) -> Result<String, AuthError> {
        let account = self
            .store
            .find_by_email(email.trim())
            .await?
            .ok_or(AuthError::NotFound)?;
        if account.is_email_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let verification_code = code::generate();
        let expires = code::expiry(Utc::now(), self.config.code_ttl_seconds());
        self.store
            .update(
                account.id,
                AccountPatch::verification_code(verification_code.clone(), expires),
            )
            .await?;

        if let Err(err) = self.mail.send_verification(&account.email, &verification_code) {
            error!("failed to send verification email: {err}");
        }

        Ok(RESEND_VERIFICATION_ACK.to_string())
    }

    /// Audit failures are logged and swallowed; they never surface to callers.
    fn record_audit(&self, event: AuditEvent) {
        if let Err(err) = self.audit.record(&event) {
            error!("failed to record audit event: {err}");
        }
    }
}
