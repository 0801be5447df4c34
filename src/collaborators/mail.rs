use async_trait::async_trait;
use thiserror::Error;

use crate::error::{AppError, AppResult};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct MailError(pub String);

/// What a failed dispatch does to the enclosing operation. OTP delivery
/// propagates (without the code the user has no path forward); visitor-pass
/// and booking notifications are logged and swallowed because the primary
/// write has already committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Propagate,
    LogAndContinue,
}

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Dispatch a message under an explicit failure policy. Returns whether the
/// message actually went out.
pub async fn dispatch(
    mailer: &dyn Mailer,
    policy: FailurePolicy,
    message: MailMessage,
) -> AppResult<bool> {
    match mailer.send(&message).await {
        Ok(()) => Ok(true),
        Err(err) => match policy {
            FailurePolicy::Propagate => Err(AppError::MailDelivery(err.to_string())),
            FailurePolicy::LogAndContinue => {
                tracing::warn!("mail to {} failed: {}", message.to, err);
                Ok(false)
            }
        },
    }
}

/// Development mailer: logs the message instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        tracing::info!(to = %message.to, subject = %message.subject, "mail dispatched (log only)");
        Ok(())
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Records sent messages; optionally fails every send.
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<MailMessage>>,
        pub fail: bool,
    }

    impl RecordingMailer {
        pub fn new(fail: bool) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError("forced failure".into()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingMailer;
    use super::*;

    #[tokio::test]
    async fn propagate_surfaces_the_failure() {
        let mailer = RecordingMailer::new(true);
        let result = dispatch(
            &mailer,
            FailurePolicy::Propagate,
            MailMessage {
                to: "a@b.com".into(),
                subject: "s".into(),
                html_body: "b".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::MailDelivery(_))));
    }

    #[tokio::test]
    async fn log_and_continue_swallows_the_failure() {
        let mailer = RecordingMailer::new(true);
        let result = dispatch(
            &mailer,
            FailurePolicy::LogAndContinue,
            MailMessage {
                to: "a@b.com".into(),
                subject: "s".into(),
                html_body: "b".into(),
            },
        )
        .await;
        assert_eq!(result.unwrap(), false);
    }

    #[tokio::test]
    async fn successful_dispatch_reports_true() {
        let mailer = RecordingMailer::new(false);
        let result = dispatch(
            &mailer,
            FailurePolicy::LogAndContinue,
            MailMessage {
                to: "a@b.com".into(),
                subject: "s".into(),
                html_body: "b".into(),
            },
        )
        .await;
        assert_eq!(result.unwrap(), true);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }
}
