//! The mail dispatcher.

use crate::envelope::Envelope;
use crate::error::{DataStage, MailError, MailResult, SmtpError};
use crate::strategy::{select_strategy, TransportStrategy};
use crate::templates::{self, RenderedEmail};
use crate::transport::{PlainCredentials, RelayTarget, SmtpTransport, Transport};
use core_config::MailerConfig;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Sends transactional emails through the configured relay.
///
/// Holds only read-only configuration, so one instance can be shared by
/// concurrent callers. Each send owns its connection(s) for its own
/// duration; retries beyond the built-in TLS fallback are up to the caller.
#[derive(Clone)]
pub struct Mailer<T = SmtpTransport> {
    config: Arc<MailerConfig>,
    relay: RelayTarget,
    credentials: PlainCredentials,
    transport: T,
}

impl Mailer<SmtpTransport> {
    /// Create a mailer talking to the relay in `config`.
    pub fn new(config: MailerConfig) -> Self {
        Self::with_transport(config, SmtpTransport::new())
    }
}

impl<T: Transport> Mailer<T> {
    /// Create a mailer over a custom transport.
    pub fn with_transport(config: MailerConfig, transport: T) -> Self {
        let relay = RelayTarget::new(config.host.clone(), config.port)
            .with_hello_name(config.hello_name.clone());
        let credentials = PlainCredentials::new(
            config.username.clone(),
            config.secret.clone(),
            config.host.clone(),
        );

        Self {
            config: Arc::new(config),
            relay,
            credentials,
            transport,
        }
    }

    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Strategy used for every send of this mailer.
    pub fn strategy(&self) -> TransportStrategy {
        select_strategy(self.relay.port)
    }

    /// Send an HTML email to one or more recipients.
    #[instrument(
        skip(self, recipients, body),
        fields(relay = %self.relay.address(), recipients = recipients.len())
    )]
    pub async fn send(&self, recipients: &[String], subject: &str, body: &str) -> MailResult<()> {
        if recipients.is_empty() {
            return Err(MailError::NoRecipients);
        }

        let envelope = Envelope::build(self.config.sender(), recipients, subject, body);
        let strategy = self.strategy();
        debug!(?strategy, transport = self.transport.name(), "Dispatching email");

        let result = match strategy {
            TransportStrategy::ImplicitTls => self.deliver_implicit_tls(&envelope).await,
            TransportStrategy::Opportunistic => self.deliver_with_fallback(&envelope).await,
        };

        match &result {
            Ok(()) => info!("Email delivered"),
            Err(e) if e.is_delivered() => {
                warn!(error = %e, "Email delivered but session did not close cleanly")
            }
            Err(e) => error!(error = %e, kind = ?e.kind(), "Email delivery failed"),
        }
        result
    }

    /// Send a one-time verification code.
    pub async fn send_verification_code(&self, to: &str, code: &str) -> MailResult<()> {
        self.send_rendered(to, templates::verification_code(code)).await
    }

    /// Send a password reset code or link.
    pub async fn send_password_reset(&self, to: &str, code_or_link: &str) -> MailResult<()> {
        self.send_rendered(to, templates::password_reset(code_or_link)).await
    }

    async fn send_rendered(&self, to: &str, email: RenderedEmail) -> MailResult<()> {
        self.send(&[to.to_string()], email.subject, &email.html).await
    }

    /// STARTTLS first; any failure there is logged and the same envelope is
    /// retried once over implicit TLS. Only the second error is returned.
    async fn deliver_with_fallback(&self, envelope: &Envelope) -> MailResult<()> {
        match self
            .transport
            .send_opportunistic(&self.relay, &self.credentials, envelope)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "STARTTLS send failed, falling back to implicit TLS");
                self.deliver_implicit_tls(envelope).await
            }
        }
    }

    /// Full command sequence over one implicit-TLS session. The session is
    /// dropped, closing the connection, on every return path.
    async fn deliver_implicit_tls(&self, envelope: &Envelope) -> MailResult<()> {
        let mut session = self.transport.connect_implicit_tls(&self.relay).await?;

        if session.supports_auth() {
            session
                .authenticate(&self.credentials)
                .await
                .map_err(MailError::Authentication)?;
            debug!("Authenticated with relay");
        }

        session
            .mail_from(envelope.sender())
            .await
            .map_err(|source| MailError::Sender {
                sender: envelope.sender().to_string(),
                source,
            })?;

        for recipient in envelope.recipients() {
            session
                .rcpt_to(recipient)
                .await
                .map_err(|source| MailError::Recipient {
                    recipient: recipient.clone(),
                    source,
                })?;
        }

        session
            .open_data()
            .await
            .map_err(transmission(DataStage::Open))?;
        session
            .write_data(envelope.as_bytes())
            .await
            .map_err(transmission(DataStage::Write))?;
        session
            .close_data()
            .await
            .map_err(transmission(DataStage::Close))?;
        debug!("Relay committed message");

        session.quit().await.map_err(MailError::Termination)
    }
}

fn transmission(stage: DataStage) -> impl FnOnce(SmtpError) -> MailError {
    move |source| MailError::Transmission { stage, source }
}
