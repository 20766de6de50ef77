use super::Notifier;
use crate::config::MailConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, info};

/// Sends alerts through an authenticated STARTTLS relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let username = config.username.clone().context("Mail username is not configured")?;
        let password = config.password.clone().context("Mail password is not configured")?;
        let from = config.from.as_deref().context("Mail sender is not configured")?;
        let from: Mailbox =
            from.parse().with_context(|| format!("Invalid sender address: {}", from))?;

        debug!("Configuring SMTP relay {}:{}", config.host, config.port);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("Failed to configure SMTP relay: {}", config.host))?
            .port(config.port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self { transport, from })
    }

    /// Builds the plain-text message without sending it.
    pub fn build_message(&self, subject: &str, body: &str, recipients: &[String]) -> Result<Message> {
        if recipients.is_empty() {
            anyhow::bail!("No recipients to send the alert to");
        }

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in recipients {
            let mailbox: Mailbox = recipient
                .parse()
                .with_context(|| format!("Invalid recipient address: {}", recipient))?;
            builder = builder.to(mailbox);
        }

        builder.body(body.to_string()).context("Failed to build email")
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        let message = self.build_message(subject, body, recipients)?;

        self.transport.send(message).await.context("Failed to send email")?;

        info!("Sent {:?} to {} recipient(s)", subject, recipients.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config() -> MailConfig {
        MailConfig {
            username: Some("bot".to_string()),
            password: Some("secret".to_string()),
            from: Some("Price Bot <bot@example.com>".to_string()),
            recipients: vec!["a@example.com".to_string()],
            ..MailConfig::default()
        }
    }

    fn recipients(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_new_requires_credentials() {
        let config = MailConfig { password: None, ..mail_config() };
        let err = SmtpNotifier::new(&config).err().unwrap().to_string();
        assert!(err.contains("password"));
    }

    #[tokio::test]
    async fn test_new_rejects_bad_sender() {
        let config = MailConfig { from: Some("not an address".to_string()), ..mail_config() };
        let err = SmtpNotifier::new(&config).err().unwrap().to_string();
        assert!(err.contains("Invalid sender address"));
    }

    #[tokio::test]
    async fn test_build_message() {
        let notifier = SmtpNotifier::new(&mail_config()).unwrap();
        let message = notifier
            .build_message(
                "Inis Price Drop Alert",
                "Inis has gone down in price from 45.00 to 39.99.",
                &recipients(&["a@example.com", "b@example.com"]),
            )
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Inis Price Drop Alert"));
        assert!(raw.contains("bot@example.com"));
        assert!(raw.contains("a@example.com"));
        assert!(raw.contains("b@example.com"));
        assert!(raw.contains("gone down in price from 45.00 to 39.99"));
    }

    #[tokio::test]
    async fn test_build_message_no_recipients() {
        let notifier = SmtpNotifier::new(&mail_config()).unwrap();
        let err = notifier.build_message("s", "b", &[]).unwrap_err().to_string();
        assert!(err.contains("No recipients"));
    }

    #[tokio::test]
    async fn test_build_message_bad_recipient() {
        let notifier = SmtpNotifier::new(&mail_config()).unwrap();
        let err =
            notifier.build_message("s", "b", &recipients(&["nope"])).unwrap_err().to_string();
        assert!(err.contains("Invalid recipient address"));
    }
}
