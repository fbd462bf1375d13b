//! Email transport abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use keyward_core::result::AppResult;

/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Delivers email messages.
#[async_trait]
pub trait EmailSender: Send + Sync + std::fmt::Debug + 'static {
    /// Sends one message.
    async fn send(&self, message: &EmailMessage) -> AppResult<()>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "Email notice (log transport)"
        );
        Ok(())
    }
}

/// Collects messages in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEmailSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MemoryEmailSender {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl EmailSender for MemoryEmailSender {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}
