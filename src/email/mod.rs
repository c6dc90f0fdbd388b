//! Outbound email. The flows only see the [`Mailer`] trait; delivery runs
//! over SMTP in production and a recording fake in tests.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailConfig;
use crate::error::AppError;
use crate::Result;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a reset link for `reset_token` to `to`. The token reaches the
    /// user only through this channel, never through an HTTP response.
    async fn send_reset_email(&self, to: &str, reset_token: &str) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    frontend_url: String,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig, frontend_url: &str) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|err| AppError::Email(format!("invalid from address: {}", err)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|err| AppError::Email(err.to_string()))?
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
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        })
    }
}

fn reset_url(frontend_url: &str, reset_token: &str) -> String {
    format!("{}/reset-password?token={}", frontend_url, reset_token)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_reset_email(&self, to: &str, reset_token: &str) -> Result<()> {
        let to: Mailbox = to
            .parse()
            .map_err(|err| AppError::Email(format!("invalid recipient: {}", err)))?;

        let url = reset_url(&self.frontend_url, reset_token);
        let body = format!(
            "<h1>Password Reset</h1>\
             <p>Click the link below to reset your password:</p>\
             <a href=\"{url}\">{url}</a>\
             <p>This link expires in 1 hour.</p>"
        );

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Reset Your Password - Moviebase")
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|err| AppError::Email(err.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|err| AppError::Email(err.to_string()))?;

        Ok(())
    }
}
