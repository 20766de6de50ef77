//! Email alerts for price changes.

pub mod message;
mod smtp;

pub use message::compose_body;
pub use smtp::SmtpNotifier;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Delivers an alert to a list of recipients.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()>;
}

/// Writes alerts to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        info!("Dry run: would email {} with subject {:?}", recipients.join(", "), subject);
        for line in body.lines() {
            info!("  {}", line);
        }
        Ok(())
    }
}
