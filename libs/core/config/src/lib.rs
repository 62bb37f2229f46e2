pub mod mailer;
pub mod password;
pub mod tracing;

use std::env;
use thiserror::Error;

pub use mailer::MailerConfig;
pub use password::PasswordConfig;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment, drives the log format
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load an environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load an environment variable or return error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Helper to load an optional environment variable, treating an empty value as unset
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });

        temp_env::with_var("APP_ENV", Some("Production"), || {
            assert!(Environment::from_env().is_production());
        });
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("SMTP_TEST_VAR", Some("relay.example.com"), || {
            assert_eq!(env_or_default("SMTP_TEST_VAR", "localhost"), "relay.example.com");
        });
        temp_env::with_var_unset("SMTP_TEST_VAR", || {
            assert_eq!(env_or_default("SMTP_TEST_VAR", "localhost"), "localhost");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("MISSING_REQUIRED", || {
            let err = env_required("MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_optional_treats_empty_as_unset() {
        temp_env::with_var("OPTIONAL_VAR", Some(""), || {
            assert_eq!(env_optional("OPTIONAL_VAR"), None);
        });
        temp_env::with_var("OPTIONAL_VAR", Some("noreply@example.com"), || {
            assert_eq!(
                env_optional("OPTIONAL_VAR"),
                Some("noreply@example.com".to_string())
            );
        });
        temp_env::with_var_unset("OPTIONAL_VAR", || {
            assert_eq!(env_optional("OPTIONAL_VAR"), None);
        });
    }
}
