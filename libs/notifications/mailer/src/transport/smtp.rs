//! Network transport over lettre's SMTP client connection.

use super::session::RelaySession;
use super::{PlainCredentials, RelayTarget, SmtpSession, Transport};
use crate::envelope::Envelope;
use crate::error::{MailError, SmtpError, SmtpResult};
use async_trait::async_trait;
use lettre::transport::smtp::{
    client::{Certificate, TlsParameters},
    Error as ClientError,
};
use tracing::{debug, warn};

/// Transport talking to a real relay.
///
/// Holds no connection state; every call opens and owns its own connection.
#[derive(Clone, Default)]
pub struct SmtpTransport {
    root_certificates: Vec<Certificate>,
}

impl SmtpTransport {
    /// Validate relay certificates against the Mozilla root set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also trust `certificate` when validating relays (private CAs).
    pub fn with_root_certificate(mut self, certificate: Certificate) -> Self {
        self.root_certificates.push(certificate);
        self
    }

    /// TLS parameters validating the certificate against `host`.
    fn tls_parameters(&self, host: &str) -> Result<TlsParameters, ClientError> {
        self.root_certificates
            .iter()
            .cloned()
            .fold(TlsParameters::builder(host.to_string()), |builder, cert| {
                builder.add_root_certificate(cert)
            })
            .build()
    }
}

/// Failures before the greeting was read are connection errors; a negative
/// or unparseable greeting/EHLO reply is a handshake error.
fn connect_error(address: String, err: ClientError) -> MailError {
    if err.status().is_some() || err.is_response() {
        MailError::Handshake {
            address,
            source: err.into(),
        }
    } else {
        MailError::Connection {
            address,
            source: err.into(),
        }
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn send_opportunistic(
        &self,
        relay: &RelayTarget,
        credentials: &PlainCredentials,
        envelope: &Envelope,
    ) -> SmtpResult<()> {
        let mut session = RelaySession::connect(relay, None).await?;

        if session.can_starttls() {
            session.starttls(self.tls_parameters(&relay.host)?).await?;
        }
        if session.supports_auth() {
            session.authenticate(credentials).await?;
        }

        session.mail_from(envelope.sender()).await?;
        for recipient in envelope.recipients() {
            session.rcpt_to(recipient).await?;
        }
        session.open_data().await?;
        session.write_data(envelope.as_bytes()).await?;
        session.close_data().await?;
        debug!(
            encrypted = session.is_encrypted(),
            "Relay accepted message over STARTTLS path"
        );

        // The message is committed; failing here would make the fallback send it twice.
        if let Err(e) = session.quit().await {
            warn!(error = %e, "QUIT failed after delivery");
        }
        Ok(())
    }

    async fn connect_implicit_tls(
        &self,
        relay: &RelayTarget,
    ) -> Result<Box<dyn SmtpSession>, MailError> {
        let address = relay.address();
        let tls = self
            .tls_parameters(&relay.host)
            .map_err(|e| MailError::Connection {
                address: address.clone(),
                source: SmtpError::from(e),
            })?;

        let session = RelaySession::connect(relay, Some(tls))
            .await
            .map_err(|e| connect_error(address, e))?;

        Ok(Box::new(session))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
