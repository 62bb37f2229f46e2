use crate::{env_optional, env_or_default, env_required, ConfigError, FromEnv};
use std::fmt;

/// Mail relay configuration for the transactional mailer.
///
/// Built once by the process and shared read-only across sends.
#[derive(Clone)]
pub struct MailerConfig {
    /// Relay host name, also used for TLS certificate validation.
    pub host: String,
    /// Relay port. 465 selects implicit TLS, anything else tries STARTTLS first.
    pub port: u16,
    pub username: String,
    pub secret: String,
    /// Optional From override; the username is used when unset.
    pub from: Option<String>,
    /// Name announced in EHLO.
    pub hello_name: String,
}

impl MailerConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            secret: secret.into(),
            from: None,
            hello_name: "localhost".to_string(),
        }
    }

    /// Builder method to override the From address. An empty value keeps the username.
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        let from = from.into();
        self.from = (!from.is_empty()).then_some(from);
        self
    }

    pub fn with_hello_name(mut self, hello_name: impl Into<String>) -> Self {
        self.hello_name = hello_name.into();
        self
    }

    /// Address used for the From header and MAIL FROM.
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }
}

impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("from", &self.from)
            .field("hello_name", &self.hello_name)
            .finish()
    }
}

impl FromEnv for MailerConfig {
    /// Reads:
    /// - SMTP_HOST: required
    /// - SMTP_PORT: defaults to 587
    /// - SMTP_USERNAME / SMTP_PASSWORD: default to empty
    /// - SMTP_FROM: optional, empty means "use SMTP_USERNAME"
    /// - SMTP_HELLO_NAME: defaults to localhost
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_required("SMTP_HOST")?;
        let port = env_or_default("SMTP_PORT", "587").parse().map_err(|e| {
            ConfigError::ParseError {
                key: "SMTP_PORT".to_string(),
                details: format!("{}", e),
            }
        })?;

        Ok(Self {
            host,
            port,
            username: env_or_default("SMTP_USERNAME", ""),
            secret: env_or_default("SMTP_PASSWORD", ""),
            from: env_optional("SMTP_FROM"),
            hello_name: env_or_default("SMTP_HELLO_NAME", "localhost"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMTP_VARS: [&str; 6] = [
        "SMTP_HOST",
        "SMTP_PORT",
        "SMTP_USERNAME",
        "SMTP_PASSWORD",
        "SMTP_FROM",
        "SMTP_HELLO_NAME",
    ];

    fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
        SMTP_VARS.iter().map(|key| (*key, None)).collect()
    }

    #[test]
    fn test_mailer_config_from_env_with_defaults() {
        let mut vars = unset_all();
        vars[0] = ("SMTP_HOST", Some("smtp.example.com"));
        temp_env::with_vars(vars, || {
            let config = MailerConfig::from_env().unwrap();
            assert_eq!(config.host, "smtp.example.com");
            assert_eq!(config.port, 587);
            assert_eq!(config.username, "");
            assert_eq!(config.from, None);
            assert_eq!(config.hello_name, "localhost");
        });
    }

    #[test]
    fn test_mailer_config_from_env_with_custom_values() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("smtp.example.com")),
                ("SMTP_PORT", Some("465")),
                ("SMTP_USERNAME", Some("mailer@example.com")),
                ("SMTP_PASSWORD", Some("hunter2")),
                ("SMTP_FROM", Some("noreply@example.com")),
                ("SMTP_HELLO_NAME", Some("api.example.com")),
            ],
            || {
                let config = MailerConfig::from_env().unwrap();
                assert_eq!(config.port, 465);
                assert_eq!(config.secret, "hunter2");
                assert_eq!(config.sender(), "noreply@example.com");
                assert_eq!(config.hello_name, "api.example.com");
            },
        );
    }

    #[test]
    fn test_mailer_config_empty_from_uses_username() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("smtp.example.com")),
                ("SMTP_USERNAME", Some("mailer@example.com")),
                ("SMTP_FROM", Some("")),
            ],
            || {
                let config = MailerConfig::from_env().unwrap();
                assert_eq!(config.from, None);
                assert_eq!(config.sender(), "mailer@example.com");
            },
        );
    }

    #[test]
    fn test_mailer_config_missing_host() {
        temp_env::with_vars(unset_all(), || {
            let err = MailerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("SMTP_HOST"));
        });
    }

    #[test]
    fn test_mailer_config_invalid_port() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("smtp.example.com")),
                ("SMTP_PORT", Some("99999")),
            ],
            || {
                let err = MailerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("SMTP_PORT"));
            },
        );
    }

    #[test]
    fn test_mailer_config_builder() {
        let config = MailerConfig::new("smtp.example.com", 587, "user@example.com", "pw")
            .with_from("")
            .with_hello_name("worker-1");
        assert_eq!(config.sender(), "user@example.com");
        assert_eq!(config.hello_name, "worker-1");

        let config = config.with_from("support@example.com");
        assert_eq!(config.sender(), "support@example.com");
    }

    #[test]
    fn test_mailer_config_debug_redacts_secret() {
        let config = MailerConfig::new("smtp.example.com", 587, "user", "top-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
