//! Postgres-backed account store.
//!
//! Uniqueness rides on the `accounts_email_key` constraint, so concurrent
//! registrations with the same email resolve at the database rather than in
//! application code. Partial updates run as read-modify-write inside one
//! transaction with a row lock.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::{AccountStore, StoreError, StoreResult};
use crate::account::{Account, AccountDraft, AccountPatch};

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, first_name, last_name, \
    is_email_verified, email_verification_code, email_verification_expires, \
    password_reset_code, password_reset_expires, refresh_token, refresh_token_expires, \
    failed_login_attempts, locked_until, is_active, created_at, updated_at";

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        is_email_verified BOOLEAN NOT NULL DEFAULT FALSE,
        email_verification_code TEXT,
        email_verification_expires TIMESTAMPTZ,
        password_reset_code TEXT,
        password_reset_expires TIMESTAMPTZ,
        refresh_token TEXT,
        refresh_token_expires TIMESTAMPTZ,
        failed_login_attempts INTEGER NOT NULL DEFAULT 0,
        locked_until TIMESTAMPTZ,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
";

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the accounts table if missing. Intended for first boot and
    /// integration tests; production deployments may prefer migrations.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "CREATE TABLE",
            db.statement = SCHEMA
        );
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to create accounts table")?;
        Ok(())
    }

    async fn find_one_by_text(&self, query: &str, value: &str) -> StoreResult<Option<Account>> {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to query account")?;
        Ok(row.as_ref().map(account_from_row))
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        self.find_one_by_text(&query, email).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to query account by id")?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn find_by_active_refresh_token(&self, token: &str) -> StoreResult<Option<Account>> {
        let query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE refresh_token = $1 AND refresh_token_expires > NOW() AND is_active"
        );
        self.find_one_by_text(&query, token).await
    }

    async fn find_by_verification_code(&self, code: &str) -> StoreResult<Option<Account>> {
        let query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE email_verification_code = $1 AND email_verification_expires > NOW()"
        );
        self.find_one_by_text(&query, code).await
    }

    async fn find_by_reset_code(&self, code: &str) -> StoreResult<Option<Account>> {
        let query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE password_reset_code = $1 AND password_reset_expires > NOW()"
        );
        self.find_one_by_text(&query, code).await
    }

    async fn create(&self, draft: AccountDraft) -> StoreResult<Account> {
        let query = format!(
            "INSERT INTO accounts \
                 (email, password_hash, first_name, last_name, \
                  email_verification_code, email_verification_expires) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(&draft.email)
            .bind(&draft.password_hash)
            .bind(&draft.first_name)
            .bind(&draft.last_name)
            .bind(&draft.email_verification_code)
            .bind(draft.email_verification_expires)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(account_from_row(&row)),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateEmail),
            Err(err) => Err(StoreError::Unavailable(
                anyhow::Error::new(err).context("failed to insert account"),
            )),
        }
    }

    async fn update(&self, id: Uuid, patch: AccountPatch) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin update transaction")?;

        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 FOR UPDATE");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .instrument(span)
            .await
            .context("failed to lock account row")?;

        let Some(row) = row else {
            let _ = tx.rollback().await;
            return Err(StoreError::NotFound);
        };

        let mut account = account_from_row(&row);
        account.apply(patch, Utc::now());

        let query = r"
            UPDATE accounts
            SET password_hash = $2,
                is_email_verified = $3,
                email_verification_code = $4,
                email_verification_expires = $5,
                password_reset_code = $6,
                password_reset_expires = $7,
                refresh_token = $8,
                refresh_token_expires = $9,
                failed_login_attempts = $10,
                locked_until = $11,
                is_active = $12,
                updated_at = NOW()
            WHERE id = $1
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .bind(&account.password_hash)
            .bind(account.is_email_verified)
            .bind(&account.email_verification_code)
            .bind(account.email_verification_expires)
            .bind(&account.password_reset_code)
            .bind(account.password_reset_expires)
            .bind(&account.refresh_token)
            .bind(account.refresh_token_expires)
            .bind(account.failed_login_attempts)
            .bind(account.locked_until)
            .bind(account.is_active)
            .execute(&mut *tx)
            .instrument(span)
            .await
            .context("failed to update account")?;

        tx.commit()
            .await
            .context("failed to commit update transaction")?;
        Ok(())
    }
}

fn account_from_row(row: &PgRow) -> Account {
    Account {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        is_email_verified: row.get("is_email_verified"),
        email_verification_code: row.get("email_verification_code"),
        email_verification_expires: row.get::<Option<DateTime<Utc>>, _>("email_verification_expires"),
        password_reset_code: row.get("password_reset_code"),
        password_reset_expires: row.get::<Option<DateTime<Utc>>, _>("password_reset_expires"),
        refresh_token: row.get("refresh_token"),
        refresh_token_expires: row.get::<Option<DateTime<Utc>>, _>("refresh_token_expires"),
        failed_login_attempts: row.get("failed_login_attempts"),
        locked_until: row.get::<Option<DateTime<Utc>>, _>("locked_until"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_unique_violation, ACCOUNT_COLUMNS, SCHEMA};

    #[test]
    fn schema_enforces_email_uniqueness() {
        assert!(SCHEMA.contains("email TEXT NOT NULL UNIQUE"));
    }

    #[test]
    fn column_list_matches_schema() {
        for column in ACCOUNT_COLUMNS.split(',').map(str::trim) {
            assert!(SCHEMA.contains(column), "schema missing column {column}");
        }
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
