//! Outbound email collaborator.
//!
//! The engine only needs a fire-and-forget `send`; delivery guarantees and
//! retries belong to implementations. Dispatch failures are logged by the
//! engine and never fail the primary state change.

use anyhow::Result;
use tracing::info;

pub trait EmailSender: Send + Sync {
    fn send_verification(&self, to: &str, code: &str) -> Result<()>;
    fn send_password_reset(&self, to: &str, code: &str) -> Result<()>;
}

/// Logs outbound mail instead of sending it. Useful for development and as
/// the default wiring in tests.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send_verification(&self, to: &str, code: &str) -> Result<()> {
        info!(to_email = %to, code = %code, "verification email send stub");
        Ok(())
    }

    fn send_password_reset(&self, to: &str, code: &str) -> Result<()> {
        info!(to_email = %to, code = %code, "password reset email send stub");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{EmailSender, LogEmailSender};

    #[test]
    fn log_sender_never_fails() {
        let sender = LogEmailSender;
        assert!(sender.send_verification("a@example.com", "123456").is_ok());
        assert!(sender.send_password_reset("a@example.com", "654321").is_ok());
    }
}
