//! Password hashing for gameshelf.
//!
//! Uses Argon2id. Hashes are PHC strings carrying their own salt and
//! parameters, so verification never depends on the current hasher settings.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;

/// Password hashing errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Hasher parameters were rejected.
    #[error("invalid hasher parameters: {0}")]
    InvalidParams(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

/// Salted one-way password hashing.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into an opaque string.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed hash never verifies.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id hasher.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Memory cost in KiB (64 MiB).
    pub const DEFAULT_M_COST: u32 = 65536;
    /// Iterations.
    pub const DEFAULT_T_COST: u32 = 3;
    /// Lanes.
    pub const DEFAULT_P_COST: u32 = 4;

    /// Create a hasher with explicit cost parameters.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        // The default constants are within argon2's accepted ranges.
        let params = Params::new(
            Self::DEFAULT_M_COST,
            Self::DEFAULT_T_COST,
            Self::DEFAULT_P_COST,
            None,
        )
        .unwrap_or_default();
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_is_phc_string() {
        let hash = fast_hasher().hash("P@ssw0rd1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = fast_hasher();
        let a = hasher.hash("same_password").unwrap();
        let b = hasher.hash("same_password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_correct_and_wrong() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct horse").unwrap();
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("wrong horse", &hash));
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(!fast_hasher().verify("anything", "not_a_valid_hash"));
    }

    #[test]
    fn test_verify_uses_parameters_from_hash() {
        let cheap = fast_hasher();
        let hash = cheap.hash("P@ssw0rd1").unwrap();
        let other = Argon2Hasher::with_params(2048, 2, 1).unwrap();
        assert!(other.verify("P@ssw0rd1", &hash));
    }

    #[test]
    fn test_default_params_in_hash() {
        let hash = Argon2Hasher::default().hash("test_password").unwrap();
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = Argon2Hasher::with_params(1, 0, 0);
        assert!(matches!(result, Err(PasswordError::InvalidParams(_))));
    }

    #[test]
    fn test_unicode_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("sénha-Ünïcode-9!").unwrap();
        assert!(hasher.verify("sénha-Ünïcode-9!", &hash));
    }
}
