//! Error types for the mailer.

use std::error::Error as _;
use std::fmt;
use thiserror::Error;

/// Result type for protocol-level operations.
pub type SmtpResult<T> = Result<T, SmtpError>;

/// Result type for a whole send.
pub type MailResult<T> = Result<T, MailError>;

/// Low-level cause of a failed SMTP exchange.
#[derive(Debug, Error)]
pub enum SmtpError {
    /// The relay answered with a negative reply code.
    #[error("{code} {message}")]
    Rejected { code: u16, message: String },

    /// The client refused to send a command.
    #[error("{0}")]
    Protocol(String),

    /// Network, TLS or reply parsing failure inside the SMTP client.
    #[error("Relay error: {0}")]
    Relay(#[source] lettre::transport::smtp::Error),

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
}

impl SmtpError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Reply code when the relay rejected a command.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<lettre::transport::smtp::Error> for SmtpError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        match err.status() {
            Some(code) => Self::Rejected {
                code: code.into(),
                message: err.source().map(ToString::to_string).unwrap_or_default(),
            },
            None => Self::Relay(err),
        }
    }
}

/// Step of the data phase that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStage {
    /// The DATA command.
    Open,
    /// Writing the rendered message.
    Write,
    /// The terminating dot, which commits the message.
    Close,
}

impl fmt::Display for DataStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "data command"),
            Self::Write => write!(f, "write message"),
            Self::Close => write!(f, "close data"),
        }
    }
}

/// Failure category of a send, one per protocol stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailErrorKind {
    Precondition,
    Connection,
    Handshake,
    Authentication,
    Envelope,
    Transmission,
    Termination,
}

/// Errors returned by the mailer.
#[derive(Debug, Error)]
pub enum MailError {
    /// Empty recipient list, rejected before any network activity.
    #[error("No recipients specified")]
    NoRecipients,

    /// TCP or TLS session could not be established.
    #[error("TLS dial to {address} failed: {source}")]
    Connection {
        address: String,
        #[source]
        source: SmtpError,
    },

    /// Greeting or EHLO rejected.
    #[error("SMTP handshake with {address} failed: {source}")]
    Handshake {
        address: String,
        #[source]
        source: SmtpError,
    },

    #[error("Authentication failed: {0}")]
    Authentication(#[source] SmtpError),

    #[error("Rejected at sender declaration for {sender}: {source}")]
    Sender {
        sender: String,
        #[source]
        source: SmtpError,
    },

    #[error("Rejected at recipient declaration for {recipient}: {source}")]
    Recipient {
        recipient: String,
        #[source]
        source: SmtpError,
    },

    #[error("Transmission failed at {stage}: {source}")]
    Transmission {
        stage: DataStage,
        #[source]
        source: SmtpError,
    },

    /// QUIT failed after the message was committed.
    #[error("Quit failed after delivery: {0}")]
    Termination(#[source] SmtpError),
}

impl MailError {
    pub fn kind(&self) -> MailErrorKind {
        match self {
            Self::NoRecipients => MailErrorKind::Precondition,
            Self::Connection { .. } => MailErrorKind::Connection,
            Self::Handshake { .. } => MailErrorKind::Handshake,
            Self::Authentication(_) => MailErrorKind::Authentication,
            Self::Sender { .. } | Self::Recipient { .. } => MailErrorKind::Envelope,
            Self::Transmission { .. } => MailErrorKind::Transmission,
            Self::Termination(_) => MailErrorKind::Termination,
        }
    }

    /// Whether the relay had already accepted the message when this error occurred.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Termination(_))
    }
}
