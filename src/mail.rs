//! Activation mail dispatch.
//!
//! The user service only sees the [`Mailer`] capability; the SMTP transport
//! lives behind it so tests can swap in a recording double.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to compose mail: {0}")]
    Compose(String),

    #[error("Failed to send mail: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the account-activation mail carrying the token to the address.
    async fn send_activation(&self, email: &str, token: &str) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid mail sender address '{}': {e}", config.from))?;

        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        }
        .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_activation(&self, email: &str, token: &str) -> Result<(), MailError> {
        let to: Mailbox = email
            .parse()
            .map_err(|e| MailError::Compose(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Account activation")
            .header(ContentType::TEXT_HTML)
            .body(format!("Token: {token}"))
            .map_err(|e| MailError::Compose(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}
