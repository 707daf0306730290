use std::sync::Mutex;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::EmailConfig;
use crate::{EmailService, NotificationError};

/// SMTP email service using an authenticated STARTTLS relay
pub struct SmtpEmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpEmailService {
    /// Create a new SMTP email service
    pub fn new(config: &EmailConfig) -> Result<Self, NotificationError> {
        let from = parse_mailbox(&config.sender_email)?;
        let to = parse_mailbox(&config.recipient_email)?;

        let credentials = Credentials::new(
            config.sender_email.clone(),
            config.sender_password.clone(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .map_err(|e| NotificationError::Transport(format!("Invalid SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { mailer, from, to })
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message, NotificationError> {
        if subject.trim().is_empty() || body.trim().is_empty() {
            return Err(NotificationError::MissingContent);
        }

        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotificationError::Message(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotificationError::InvalidAddress(format!("{}: {}", address, e)))
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(&self, subject: &str, body: &str) -> Result<String, NotificationError> {
        let message = self.build_message(subject, body)?;

        info!("Sending email to {} with subject: {}", self.to, subject);

        let response = self
            .mailer
            .send(message)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let reply = response.message().collect::<Vec<_>>().join(" ");
        debug!("SMTP relay replied {}: {}", response.code(), reply);

        Ok(format!("{} {}", response.code(), reply))
    }
}

/// A message captured by [`MockEmailService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Mock email service for dry runs and tests; logs and records instead of sending
#[derive(Default)]
pub struct MockEmailService {
    sent: Mutex<Vec<SentEmail>>,
}

impl MockEmailService {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "sent" so far, oldest first
    pub fn sent_messages(&self) -> Vec<SentEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_email(&self, subject: &str, body: &str) -> Result<String, NotificationError> {
        if subject.trim().is_empty() || body.trim().is_empty() {
            return Err(NotificationError::MissingContent);
        }

        info!("📧 [MOCK EMAIL] Subject: {}", subject);
        info!("📧 [MOCK EMAIL] Body:\n{}", body);

        let mut sent = self
            .sent
            .lock()
            .map_err(|_| NotificationError::Transport("mock mailbox poisoned".to_string()))?;
        sent.push(SentEmail {
            subject: subject.to_string(),
            body: body.to_string(),
        });

        Ok(format!("mock-email-{}", sent.len()))
    }
}
