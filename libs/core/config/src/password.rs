use crate::FromEnv;
use crate::ConfigError;
use tracing::warn;

/// Cost applied when PASSWORD_HASH_COST is unset or unparseable.
pub const DEFAULT_HASH_COST: u32 = 2;

/// Password hashing configuration, resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordConfig {
    /// Adaptive cost (iteration count) for the password hash.
    pub cost: u32,
}

impl PasswordConfig {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            cost: DEFAULT_HASH_COST,
        }
    }
}

impl FromEnv for PasswordConfig {
    /// Reads PASSWORD_HASH_COST, falling back to the default cost when it is
    /// unset or not a number.
    fn from_env() -> Result<Self, ConfigError> {
        let cost = match std::env::var("PASSWORD_HASH_COST") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Invalid PASSWORD_HASH_COST, using default cost");
                DEFAULT_HASH_COST
            }),
            Err(_) => DEFAULT_HASH_COST,
        };

        Ok(Self { cost })
    }
}
