//! Mail Dispatch CLI
//!
//! Operator tool for the transactional mailer: sends test messages through
//! the configured relay and exercises the password hasher.
//!
//! Relay settings come from `SMTP_*` variables, the hash cost from
//! `PASSWORD_HASH_COST`; both are read once at startup.

use clap::{Parser, Subcommand};
use core_config::{FromEnv, MailerConfig, PasswordConfig};
use eyre::{Result, WrapErr};
use mailer::Mailer;
use password::PasswordHasher;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "mail-dispatch")]
#[command(about = "Send transactional emails through the configured SMTP relay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
    /// Send an HTML email
    Send {
        /// Recipient addresses (comma separated or repeated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        to: Vec<String>,

        #[arg(short, long)]
        subject: String,

        /// HTML body, inserted verbatim
        #[arg(short, long)]
        body: String,
    },

    /// Send a verification code email
    VerificationCode { to: String, code: String },

    /// Send a password reset email
    PasswordReset { to: String, code_or_link: String },

    /// Hash a password with the configured cost
    HashPassword { plaintext: String },

    /// Check a password against a digest
    VerifyPassword { plaintext: String, digest: String },
}

/// Execute one command.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Send { to, subject, body } => {
            let mailer = mailer_from_env()?;
            mailer
                .send(&to, &subject, &body)
                .await
                .wrap_err("Failed to send email")?;
            info!(recipients = to.len(), "Email sent");
        }
        Commands::VerificationCode { to, code } => {
            let mailer = mailer_from_env()?;
            mailer
                .send_verification_code(&to, &code)
                .await
                .wrap_err("Failed to send verification code")?;
            info!(%to, "Verification code sent");
        }
        Commands::PasswordReset { to, code_or_link } => {
            let mailer = mailer_from_env()?;
            mailer
                .send_password_reset(&to, &code_or_link)
                .await
                .wrap_err("Failed to send password reset")?;
            info!(%to, "Password reset sent");
        }
        Commands::HashPassword { plaintext } => {
            let hasher = hasher_from_env()?;
            println!("{}", hasher.hash(&plaintext)?);
        }
        Commands::VerifyPassword { plaintext, digest } => {
            let hasher = hasher_from_env()?;
            let matches = hasher.verify(&plaintext, &digest);
            println!("{}", if matches { "match" } else { "mismatch" });
            if !matches {
                eyre::bail!("Password does not match digest");
            }
        }
    }

    Ok(())
}

fn mailer_from_env() -> Result<Mailer> {
    let config = MailerConfig::from_env().wrap_err("Invalid SMTP configuration")?;
    info!(host = %config.host, port = config.port, "Mailer configured");
    Ok(Mailer::new(config))
}

fn hasher_from_env() -> Result<PasswordHasher> {
    let config = PasswordConfig::from_env()?;
    Ok(PasswordHasher::new(&config)?)
}
