use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Plaintext behind the hash checked when no stored hash exists
const DUMMY_PASSWORD: &str = "jobboard-dummy-password";

/// Password hashing algorithm types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    /// bcrypt with a configurable work factor
    #[default]
    Bcrypt,
    /// Argon2id with the crate's default parameters
    Argon2id,
}

impl std::fmt::Display for PasswordAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bcrypt => write!(f, "bcrypt"),
            Self::Argon2id => write!(f, "Argon2id"),
        }
    }
}

/// Abstract trait for password hashing algorithms
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verify a plaintext password against a hash
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;

    /// Check if a string is a hash created by this algorithm
    fn is_hash(&self, value: &str) -> bool;

    /// Get the algorithm identifier
    fn algorithm(&self) -> PasswordAlgorithm;
}

pub mod argon2_hasher;
pub mod bcrypt_hasher;

pub use argon2_hasher::Argon2idHasher;
pub use bcrypt_hasher::BcryptHasher;

/// Password manager with support for multiple algorithms
///
/// New passwords are hashed with the configured algorithm; verification
/// picks the hasher from the stored hash format, so hashes written under a
/// previous setting keep working.
pub struct PasswordManager {
    /// Current algorithm for new passwords
    current_algorithm: PasswordAlgorithm,
    /// Available hashers
    hashers: Vec<Box<dyn PasswordHasher>>,
    /// Hash of [`DUMMY_PASSWORD`] with the current settings, made on first use
    dummy_hash: OnceLock<String>,
}

impl Default for PasswordManager {
    fn default() -> Self {
        Self {
            current_algorithm: PasswordAlgorithm::default(),
            hashers: vec![
                Box::new(BcryptHasher::new()),
                Box::new(Argon2idHasher::new()),
            ],
            dummy_hash: OnceLock::new(),
        }
    }
}

impl PasswordManager {
    /// Create a new PasswordManager with the given algorithm and bcrypt cost
    pub fn new(default_algorithm: PasswordAlgorithm, bcrypt_cost: u32) -> AppResult<Self> {
        let hashers: Vec<Box<dyn PasswordHasher>> = vec![
            Box::new(BcryptHasher::with_cost(bcrypt_cost)?),
            Box::new(Argon2idHasher::new()),
        ];

        Ok(Self {
            current_algorithm: default_algorithm,
            hashers,
            dummy_hash: OnceLock::new(),
        })
    }

    /// Hash a plaintext password using the current algorithm
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        if password.is_empty() {
            return Err(AppError::BadRequest("Password cannot be empty".to_string()));
        }

        let hasher = self
            .hashers
            .iter()
            .find(|h| h.algorithm() == self.current_algorithm)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Hasher not found for algorithm: {}",
                    self.current_algorithm
                ))
            })?;

        hasher.hash_password(password)
    }

    /// Verify a plaintext password against any supported hash format
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        // Try each hasher until one can handle this hash format
        for hasher in &self.hashers {
            if hasher.is_hash(hash) {
                return hasher.verify_password(password, hash);
            }
        }

        Err(AppError::Internal("Unsupported hash format".to_string()))
    }

    /// Run a full verification against a throwaway hash
    ///
    /// Called when there is no stored hash to check, so a login for an
    /// unknown user costs the same as a wrong password.
    pub fn verify_dummy(&self, password: &str) -> AppResult<()> {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash,
            None => {
                let hash = self.hash_password(DUMMY_PASSWORD)?;
                self.dummy_hash.get_or_init(|| hash)
            }
        };

        self.verify_password(password, hash)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn has_dummy_hash(&self) -> bool {
        self.dummy_hash.get().is_some()
    }

    /// Detect the algorithm used for a given hash
    pub fn detect_algorithm(&self, hash: &str) -> Option<PasswordAlgorithm> {
        self.hashers
            .iter()
            .find(|hasher| hasher.is_hash(hash))
            .map(|hasher| hasher.algorithm())
    }

    /// Get the current default algorithm
    pub fn current_algorithm(&self) -> PasswordAlgorithm {
        self.current_algorithm
    }
}
