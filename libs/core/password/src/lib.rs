//! Password hashing with an adaptive, injected cost.
//!
//! The cost is resolved once by the configuration loader
//! ([`core_config::PasswordConfig`]) and handed to [`PasswordHasher::new`];
//! nothing in here reads process state.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use core_config::PasswordConfig;
use thiserror::Error;
use tracing::debug;

pub type PasswordResult<T> = Result<T, PasswordError>;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid hash cost {cost}: {details}")]
    InvalidCost { cost: u32, details: String },

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Hashes and verifies passwords with Argon2id.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    cost: u32,
}

impl PasswordHasher {
    /// Build a hasher for the configured cost.
    ///
    /// The cost is the Argon2 iteration count; memory and parallelism keep
    /// the library defaults.
    pub fn new(config: &PasswordConfig) -> PasswordResult<Self> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            config.cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| PasswordError::InvalidCost {
            cost: config.cost,
            details: e.to_string(),
        })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost: config.cost,
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password into a PHC string digest.
    pub fn hash(&self, plaintext: &str) -> PasswordResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Check a plaintext password against a digest.
    ///
    /// The digest carries its own parameters, so hashes produced under an
    /// older cost still verify. Legacy bcrypt digests (`$2a$`, `$2b$`, `$2y$`)
    /// are checked with bcrypt. A malformed digest never matches.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        if is_bcrypt(digest) {
            return bcrypt::verify(plaintext, digest).unwrap_or_else(|e| {
                debug!(error = %e, "Rejecting malformed bcrypt digest");
                false
            });
        }

        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Rejecting malformed password digest");
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

fn is_bcrypt(digest: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| digest.starts_with(prefix))
}
