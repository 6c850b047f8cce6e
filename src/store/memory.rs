//! In-memory reference store.
//!
//! Backs the engine in tests. Uniqueness and updates are atomic under the
//! write lock, mirroring what the relational store gets from its
//! constraints.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{AccountStore, StoreError, StoreResult};
use crate::account::{Account, AccountDraft, AccountPatch};

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_active_refresh_token(&self, token: &str) -> StoreResult<Option<Account>> {
        let now = Utc::now();
        let accounts = self.accounts.read().unwrap();
        Ok(accounts
            .values()
            .find(|a| {
                a.is_active
                    && a.refresh_token.as_deref() == Some(token)
                    && a.refresh_token_expires.is_some_and(|expires| expires > now)
            })
            .cloned())
    }

    async fn find_by_verification_code(&self, code: &str) -> StoreResult<Option<Account>> {
        let now = Utc::now();
        let accounts = self.accounts.read().unwrap();
        Ok(accounts
            .values()
            .find(|a| {
                a.email_verification_code.as_deref() == Some(code)
                    && a.email_verification_expires
                        .is_some_and(|expires| expires > now)
            })
            .cloned())
    }

    async fn find_by_reset_code(&self, code: &str) -> StoreResult<Option<Account>> {
        let now = Utc::now();
        let accounts = self.accounts.read().unwrap();
        Ok(accounts
            .values()
            .find(|a| {
                a.password_reset_code.as_deref() == Some(code)
                    && a.password_reset_expires.is_some_and(|expires| expires > now)
            })
            .cloned())
    }

    async fn create(&self, draft: AccountDraft) -> StoreResult<Account> {
        // check-then-insert stays atomic because both happen under the write lock
        let mut accounts = self.accounts.write().unwrap();
        if accounts.values().any(|a| a.email == draft.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: draft.email,
            password_hash: draft.password_hash,
            first_name: draft.first_name,
            last_name: draft.last_name,
            is_email_verified: false,
            email_verification_code: Some(draft.email_verification_code),
            email_verification_expires: Some(draft.email_verification_expires),
            password_reset_code: None,
            password_reset_expires: None,
            refresh_token: None,
            refresh_token_expires: None,
            failed_login_attempts: 0,
            locked_until: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, id: Uuid, patch: AccountPatch) -> StoreResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        account.apply(patch, Utc::now());
        Ok(())
    }
}
