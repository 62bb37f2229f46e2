//! [`SmtpSession`] over a lettre client connection.

use super::{PlainCredentials, RelayTarget, SmtpSession};
use crate::error::{SmtpError, SmtpResult};
use async_trait::async_trait;
use lettre::{
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{AsyncSmtpConnection, TlsParameters},
        commands::{Data, Mail, Rcpt},
        extension::{ClientId, Extension, MailBodyParameter, MailParameter},
        Error as ClientError,
    },
    Address,
};
use std::mem;
use tracing::debug;

/// Mechanisms that count as an advertised AUTH capability.
const AUTH_MECHANISMS: [Mechanism; 3] = [Mechanism::Plain, Mechanism::Login, Mechanism::Xoauth2];

/// Host names PLAIN credentials may be sent to without encryption.
fn is_localhost(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

/// One live connection to the relay.
///
/// Message bytes are buffered by `write_data` and sent, dot-stuffed and
/// terminated, by `close_data`. Dropping the session closes the socket.
pub(crate) struct RelaySession {
    connection: AsyncSmtpConnection,
    host: String,
    hello_name: ClientId,
    pending: Vec<u8>,
}

impl RelaySession {
    /// Connect, read the greeting and send EHLO. With `tls` set the socket is
    /// wrapped in TLS before the greeting is read.
    pub(crate) async fn connect(
        relay: &RelayTarget,
        tls: Option<TlsParameters>,
    ) -> Result<Self, ClientError> {
        let hello_name = ClientId::Domain(relay.hello_name.clone());
        let connection = AsyncSmtpConnection::connect_tokio1(
            (relay.host.as_str(), relay.port),
            None,
            &hello_name,
            tls,
            None,
        )
        .await?;
        debug!(
            address = %relay.address(),
            encrypted = connection.is_encrypted(),
            "SMTP session established"
        );

        Ok(Self {
            connection,
            host: relay.host.clone(),
            hello_name,
            pending: Vec::new(),
        })
    }

    pub(crate) fn can_starttls(&self) -> bool {
        self.connection.can_starttls()
    }

    /// STARTTLS, then EHLO again over the encrypted stream.
    pub(crate) async fn starttls(&mut self, tls: TlsParameters) -> SmtpResult<()> {
        self.connection.starttls(tls, &self.hello_name).await?;
        debug!(host = %self.host, "Connection upgraded with STARTTLS");
        Ok(())
    }

    pub(crate) fn is_encrypted(&self) -> bool {
        self.connection.is_encrypted()
    }
}

#[async_trait]
impl SmtpSession for RelaySession {
    fn supports_auth(&self) -> bool {
        let info = self.connection.server_info();
        AUTH_MECHANISMS
            .iter()
            .any(|mechanism| info.supports_auth_mechanism(*mechanism))
    }

    async fn authenticate(&mut self, credentials: &PlainCredentials) -> SmtpResult<()> {
        if credentials.host != self.host {
            return Err(SmtpError::protocol(format!(
                "credentials for {} refused by session with {}",
                credentials.host, self.host
            )));
        }
        if !self.is_encrypted() && !is_localhost(&self.host) {
            return Err(SmtpError::protocol(
                "refusing to send credentials over an unencrypted connection",
            ));
        }

        let credentials = Credentials::new(
            credentials.username.clone(),
            credentials.secret.clone(),
        );
        self.connection
            .auth(&[Mechanism::Plain], &credentials)
            .await?;
        Ok(())
    }

    async fn mail_from(&mut self, sender: &str) -> SmtpResult<()> {
        let sender: Address = sender.parse()?;
        let parameters = if self
            .connection
            .server_info()
            .supports_feature(Extension::EightBitMime)
        {
            vec![MailParameter::Body(MailBodyParameter::EightBitMime)]
        } else {
            Vec::new()
        };

        self.connection
            .command(Mail::new(Some(sender), parameters))
            .await?;
        Ok(())
    }

    async fn rcpt_to(&mut self, recipient: &str) -> SmtpResult<()> {
        let recipient: Address = recipient.parse()?;
        self.connection
            .command(Rcpt::new(recipient, Vec::new()))
            .await?;
        Ok(())
    }

    async fn open_data(&mut self) -> SmtpResult<()> {
        self.connection.command(Data).await?;
        self.pending.clear();
        Ok(())
    }

    async fn write_data(&mut self, content: &[u8]) -> SmtpResult<()> {
        self.pending.extend_from_slice(content);
        Ok(())
    }

    async fn close_data(&mut self) -> SmtpResult<()> {
        let content = mem::take(&mut self.pending);
        let response = self.connection.message(&content).await?;
        debug!(code = %response.code(), "Relay accepted message data");
        Ok(())
    }

    async fn quit(&mut self) -> SmtpResult<()> {
        self.connection.quit().await?;
        Ok(())
    }
}
