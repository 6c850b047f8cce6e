//! Structured audit events emitted by the engine.
//!
//! Write-only from the engine's perspective: events are emitted and never
//! read back. Recorder failures are swallowed by the engine so audit can
//! never break an authentication flow.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditStatus {
    Success,
    Failed,
}

impl AuditStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuditEvent {
    pub action: &'static str,
    pub resource: &'static str,
    pub account_id: Option<Uuid>,
    pub client_ip: Option<String>,
    pub metadata: Option<Value>,
    pub status: AuditStatus,
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    #[must_use]
    pub fn success(action: &'static str, resource: &'static str) -> Self {
        Self {
            action,
            resource,
            account_id: None,
            client_ip: None,
            metadata: None,
            status: AuditStatus::Success,
            error_detail: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn failed(action: &'static str, resource: &'static str, detail: String) -> Self {
        Self {
            status: AuditStatus::Failed,
            error_detail: Some(detail),
            ..Self::success(action, resource)
        }
    }

    #[must_use]
    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

pub trait AuditRecorder: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<()>;
}

/// Emits audit events into the tracing pipeline. Persistence, if any,
/// belongs to a collaborator behind the same trait.
#[derive(Clone, Debug)]
pub struct LogAuditRecorder;

impl AuditRecorder for LogAuditRecorder {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        info!(
            action = event.action,
            resource = event.resource,
            account_id = ?event.account_id,
            status = event.status.as_str(),
            error = ?event.error_detail,
            "audit event"
        );
        Ok(())
    }
}
