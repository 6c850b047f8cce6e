//! # Chiavi (Account Authentication Core)
//!
//! `chiavi` is the credential and token lifecycle engine behind a standard
//! email/password authentication service: registration, credential
//! verification, session-token issuance, email-code verification, password
//! reset, and brute-force lockout.
//!
//! ## State Model
//!
//! Each [`account::Account`] carries its own authentication state: the
//! password hash, a single outstanding email-verification code, a single
//! outstanding password-reset code, the active refresh token, and the
//! failed-attempt counter with its lock timestamp.
//!
//! - **Codes** are 6-digit numeric secrets, single-use, bound to one purpose
//!   and one expiry. Issuing a new code of a kind invalidates the previous
//!   one unconditionally.
//! - **Email verification** transitions once, irreversibly, from unverified
//!   to verified.
//! - **Refresh tokens** are signed and additionally persisted on the account,
//!   so logout revokes them immediately. Access tokens stay stateless and
//!   expire naturally.
//! - **Lockout** trips after repeated failed logins and clears lazily once
//!   the lock window has elapsed; no background sweep exists.
//!
//! ## Enumeration Resistance
//!
//! `validate_credentials` never distinguishes an unknown email from a wrong
//! password, and `forgot_password` returns the identical acknowledgment
//! whether or not the address is registered.
//!
//! ## Wiring
//!
//! The engine receives its collaborators (account store, mail sender, audit
//! recorder, token issuer) as explicit constructor parameters, so tests can
//! substitute the in-memory store and capturing fakes.

pub mod account;
pub mod audit;
pub mod code;
pub mod config;
pub mod email;
pub mod engine;
pub mod error;
pub mod password;
pub mod store;
pub mod token;

pub use account::{Account, AccountDraft, AccountPatch, PublicProfile};
pub use config::AuthConfig;
pub use engine::AccountEngine;
pub use error::AuthError;
pub use token::TokenIssuer;
