//! Transactional mail dispatcher.
//!
//! Sends single messages (verification codes, password resets) to an SMTP
//! relay. Port 465 goes straight to implicit TLS; any other port first tries
//! a STARTTLS send and falls back to implicit TLS when that fails.
//!
//! ## Components
//!
//! - **Message builder**: [`Envelope`] renders headers and HTML body
//! - **Transport selector**: [`select_strategy`] picks the path from the port
//! - **Transport executor**: [`Mailer`] drives the [`Transport`] / [`SmtpSession`] seams
//!
//! ## Usage
//!
//! ```ignore
//! use core_config::{FromEnv, MailerConfig};
//! use mailer::Mailer;
//!
//! let mailer = Mailer::new(MailerConfig::from_env()?);
//! mailer.send_verification_code("user@example.com", "482913").await?;
//! ```

pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod strategy;
pub mod templates;
pub mod transport;

pub use dispatcher::Mailer;
pub use envelope::Envelope;
pub use error::{DataStage, MailError, MailErrorKind, MailResult, SmtpError, SmtpResult};
pub use strategy::{select_strategy, TransportStrategy, IMPLICIT_TLS_PORT};
pub use templates::RenderedEmail;
pub use transport::{PlainCredentials, RelayTarget, SmtpSession, SmtpTransport, Transport};
