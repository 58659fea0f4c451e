//! SMTP delivery for broadcast emails.

use async_trait::async_trait;
use eventcast_core::dispatch::{MailCredentials, MailTransportTrait, OutboundEmail};
use eventcast_core::errors::{Error, Result};
use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::SmtpConfig;

/// Port on which the relay expects implicit TLS rather than STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

const CALENDAR_FILENAME: &str = "invite.ics";

fn transport_err(context: &str, err: impl std::fmt::Display) -> Error {
    Error::Transport(format!("{}: {}", context, err))
}

/// Async SMTP transport, or log-only mode when no host is configured.
pub struct SmtpMailer {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let transport = match &config.host {
            Some(host) => {
                let credentials = match (&config.username, &config.password) {
                    (Some(username), Some(password)) => Some(MailCredentials {
                        username: username.clone(),
                        password: password.clone(),
                    }),
                    _ => None,
                };
                Some(build_transport(host, config.port, credentials.as_ref())?)
            }
            None => {
                tracing::warn!("SMTP host not configured; emails will be logged only");
                None
            }
        };
        Ok(Self { config, transport })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }
}

fn build_transport(
    host: &str,
    port: u16,
    credentials: Option<&MailCredentials>,
) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    let builder = if port == IMPLICIT_TLS_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::relay(host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
    }
    .map_err(|e| transport_err("Failed to configure SMTP transport", e))?
    .port(port);

    let builder = match credentials {
        Some(creds) => builder.credentials(Credentials::new(
            creds.username.clone(),
            creds.password.clone(),
        )),
        None => builder,
    };
    Ok(builder.build())
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| transport_err(&format!("Invalid address '{}'", address), e))
}

fn content_type(value: &str) -> Result<ContentType> {
    ContentType::parse(value).map_err(|e| transport_err("Invalid content type", e))
}

/// Renders an outbound email as a MIME message: the text (and optional HTML)
/// body, then the calendar invite and any attachments.
pub fn build_message(email: &OutboundEmail) -> Result<Message> {
    let mut builder = Message::builder()
        .from(mailbox(&email.from)?)
        .to(mailbox(&email.to)?)
        .subject(email.subject.clone());
    for cc in &email.cc {
        builder = builder.cc(mailbox(cc)?);
    }

    let body = match &email.html_body {
        Some(html) => MultiPart::alternative_plain_html(email.text_body.clone(), html.clone()),
        None => MultiPart::mixed().singlepart(SinglePart::plain(email.text_body.clone())),
    };
    let mut parts = MultiPart::mixed().multipart(body);

    if let Some(invite) = &email.calendar {
        parts = parts.singlepart(
            Attachment::new(CALENDAR_FILENAME.to_string())
                .body(invite.to_ics(), content_type(&invite.content_type())?),
        );
    }
    for attachment in &email.attachments {
        parts = parts.singlepart(
            Attachment::new(attachment.filename.clone()).body(
                attachment.content.clone(),
                content_type(&attachment.content_type)?,
            ),
        );
    }

    builder
        .multipart(parts)
        .map_err(|e| transport_err("Failed to build email message", e))
}

#[async_trait]
impl MailTransportTrait for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let message = build_message(email)?;

        let Some(default_transport) = &self.transport else {
            info!(
                subject = %email.subject,
                to = %email.to,
                "Email service running in log-only mode; skipping actual send"
            );
            return Ok(());
        };

        match (&email.credentials, &self.config.host) {
            (Some(creds), Some(host)) => {
                debug!("Sending with per-message SMTP credentials for {}", creds.username);
                build_transport(host, self.config.port, Some(creds))?
                    .send(message)
                    .await
                    .map_err(|e| transport_err("Failed to send email", e))?;
            }
            _ => {
                default_transport
                    .send(message)
                    .await
                    .map_err(|e| transport_err("Failed to send email", e))?;
            }
        }
        info!(subject = %email.subject, to = %email.to, "Email sent");
        Ok(())
    }
}
