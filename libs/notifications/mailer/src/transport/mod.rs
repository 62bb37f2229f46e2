//! Transport seams of the mailer.
//!
//! [`Transport`] opens connections and runs the one-shot STARTTLS send;
//! [`SmtpSession`] is one live session driven command by command. Both are
//! traits so the dispatcher can be exercised without a network.

mod session;
mod smtp;

pub use smtp::SmtpTransport;

use crate::envelope::Envelope;
use crate::error::{MailError, SmtpResult};
use async_trait::async_trait;
use std::fmt;

/// Relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    pub host: String,
    pub port: u16,
    /// Name announced in EHLO.
    pub hello_name: String,
}

impl RelayTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            hello_name: "localhost".to_string(),
        }
    }

    pub fn with_hello_name(mut self, hello_name: impl Into<String>) -> Self {
        self.hello_name = hello_name.into();
        self
    }

    /// "host:port", with IPv6 literals bracketed.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// PLAIN credentials bound to the relay host they were issued for.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainCredentials {
    pub username: String,
    pub secret: String,
    pub host: String,
}

impl PlainCredentials {
    pub fn new(
        username: impl Into<String>,
        secret: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
            host: host.into(),
        }
    }
}

impl fmt::Debug for PlainCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainCredentials")
            .field("username", &self.username)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

/// One live SMTP session, past the greeting and EHLO.
///
/// Dropping the session closes the connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmtpSession: Send {
    /// Whether the relay advertised AUTH in its EHLO reply.
    fn supports_auth(&self) -> bool;

    /// AUTH PLAIN. Refused without encryption unless the relay is localhost.
    async fn authenticate(&mut self, credentials: &PlainCredentials) -> SmtpResult<()>;

    /// MAIL FROM.
    async fn mail_from(&mut self, sender: &str) -> SmtpResult<()>;

    /// RCPT TO.
    async fn rcpt_to(&mut self, recipient: &str) -> SmtpResult<()>;

    /// DATA, expecting the 354 go-ahead.
    async fn open_data(&mut self) -> SmtpResult<()>;

    /// Write message bytes inside the data phase.
    async fn write_data(&mut self, content: &[u8]) -> SmtpResult<()>;

    /// Terminate the data phase; success means the relay committed the message.
    async fn close_data(&mut self) -> SmtpResult<()>;

    /// QUIT.
    async fn quit(&mut self) -> SmtpResult<()>;
}

/// Connection factory and STARTTLS sender.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Single-call send over a plain connection, upgraded with STARTTLS when
    /// the relay offers it.
    async fn send_opportunistic(
        &self,
        relay: &RelayTarget,
        credentials: &PlainCredentials,
        envelope: &Envelope,
    ) -> SmtpResult<()>;

    /// Open a TLS connection validated against the relay host and complete
    /// the greeting and EHLO.
    ///
    /// Fails with [`MailError::Connection`] or [`MailError::Handshake`].
    async fn connect_implicit_tls(
        &self,
        relay: &RelayTarget,
    ) -> Result<Box<dyn SmtpSession>, MailError>;

    fn name(&self) -> &'static str;
}
