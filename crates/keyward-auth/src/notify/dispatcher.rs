//! Fire-and-forget email dispatch.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use keyward_core::config::EmailConfig;
use keyward_entity::user::User;

use super::sender::{EmailMessage, EmailSender};

/// Sends account notices without blocking the caller.
///
/// Each message is delivered on its own task bounded by the configured
/// timeout; delivery failures are logged and never reach the caller.
#[derive(Debug, Clone)]
pub struct EmailDispatcher {
    sender: Arc<dyn EmailSender>,
    from: String,
    enabled: bool,
    timeout: Duration,
}

impl EmailDispatcher {
    /// Creates a dispatcher over `sender`.
    pub fn new(config: &EmailConfig, sender: Arc<dyn EmailSender>) -> Self {
        Self {
            sender,
            from: config.from.clone(),
            enabled: config.enabled,
            timeout: Duration::from_secs(config.dispatch_timeout_seconds.max(1)),
        }
    }

    /// Queues a message. Returns `None` when email is disabled.
    pub fn dispatch(&self, to: &str, subject: &str, body: String) -> Option<JoinHandle<()>> {
        if !self.enabled {
            return None;
        }

        let message = EmailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            body,
        };
        let sender = Arc::clone(&self.sender);
        let timeout = self.timeout;

        Some(tokio::spawn(async move {
            match tokio::time::timeout(timeout, sender.send(&message)).await {
                Ok(Ok(())) => debug!(to = %message.to, subject = %message.subject, "Email sent"),
                Ok(Err(e)) => {
                    error!(to = %message.to, subject = %message.subject, error = %e, "Email delivery failed");
                }
                Err(_) => {
                    error!(to = %message.to, subject = %message.subject, "Email delivery timed out");
                }
            }
        }))
    }

    /// Tells the user their account was locked.
    pub fn lockout_notice(&self, user: &User, until: DateTime<Utc>) -> Option<JoinHandle<()>> {
        let to = user.email.as_deref()?;
        self.dispatch(
            to,
            "Your account has been locked",
            format!(
                "Hello {},\n\nYour account was locked after repeated failed sign-in attempts. \
                 You can sign in again after {}.\n\nIf this wasn't you, reset your password.",
                user.username,
                until.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        )
    }

    /// Tells the user their password changed.
    pub fn password_changed_notice(&self, user: &User) -> Option<JoinHandle<()>> {
        let to = user.email.as_deref()?;
        self.dispatch(
            to,
            "Your password was changed",
            format!(
                "Hello {},\n\nThe password for your account was just changed and every \
                 existing session was signed out.",
                user.username
            ),
        )
    }

    /// Acknowledges a password reset request.
    pub fn password_reset_notice(&self, user: &User) -> Option<JoinHandle<()>> {
        let to = user.email.as_deref()?;
        self.dispatch(
            to,
            "Password reset requested",
            format!(
                "Hello {},\n\nA password reset was requested for your account. \
                 Contact an administrator to complete it. If this wasn't you, \
                 you can ignore this message.",
                user.username
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use keyward_core::error::AppError;
    use keyward_core::result::AppResult;
    use keyward_entity::user::NewUser;

    use super::*;
    use crate::notify::MemoryEmailSender;

    fn user(email: Option<&str>) -> User {
        NewUser {
            username: "alice".into(),
            email: email.map(Into::into),
            password_hash: String::new(),
            email_confirmed: true,
        }
        .into_user(Utc::now())
    }

    #[tokio::test]
    async fn test_notice_delivered() {
        let outbox = MemoryEmailSender::new();
        let dispatcher = EmailDispatcher::new(&EmailConfig::default(), Arc::new(outbox.clone()));

        dispatcher
            .password_changed_notice(&user(Some("alice@example.com")))
            .unwrap()
            .await
            .unwrap();

        let sent = outbox.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert_eq!(sent[0].from, "no-reply@keyward.local");
    }

    #[tokio::test]
    async fn test_no_email_no_notice() {
        let outbox = MemoryEmailSender::new();
        let dispatcher = EmailDispatcher::new(&EmailConfig::default(), Arc::new(outbox.clone()));
        assert!(dispatcher.password_reset_notice(&user(None)).is_none());
    }

    #[tokio::test]
    async fn test_disabled() {
        let outbox = MemoryEmailSender::new();
        let config = EmailConfig {
            enabled: false,
            ..EmailConfig::default()
        };
        let dispatcher = EmailDispatcher::new(&config, Arc::new(outbox.clone()));
        assert!(
            dispatcher
                .password_reset_notice(&user(Some("a@example.com")))
                .is_none()
        );
    }

    #[derive(Debug)]
    struct FailingSender;

    #[async_trait]
    impl EmailSender for FailingSender {
        async fn send(&self, _message: &EmailMessage) -> AppResult<()> {
            Err(AppError::internal("smtp unavailable"))
        }
    }

    #[tokio::test]
    async fn test_failure_is_contained() {
        let dispatcher = EmailDispatcher::new(&EmailConfig::default(), Arc::new(FailingSender));
        let handle = dispatcher
            .lockout_notice(&user(Some("a@example.com")), Utc::now())
            .unwrap();
        assert!(handle.await.is_ok());
    }
}
