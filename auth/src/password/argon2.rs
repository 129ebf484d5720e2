use std::sync::Arc;
use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

const DECOY_PASSWORD: &str = "decoy-password-never-issued";

/// Password hashing implementation.
///
/// Produces self-contained PHC strings (Argon2id, cost parameters, salt and
/// hash in one value) so the cost can be raised later without invalidating
/// digests already stored.
///
/// Verifying against a missing or unparsable digest still runs one Argon2
/// verification, against a decoy digest of the same cost, so a rejection
/// costs the same whatever its cause.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    decoy: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Largest plaintext accepted, in bytes. Longer inputs are rejected, never truncated.
    pub const MAX_PASSWORD_BYTES: usize = 1024;

    /// Create a hasher with the Argon2 crate's default cost.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
            decoy: Arc::new(OnceLock::new()),
        }
    }

    /// Create a hasher with an explicit cost.
    ///
    /// # Arguments
    /// * `memory_kib` - Memory cost in KiB
    /// * `iterations` - Number of passes
    /// * `parallelism` - Degree of parallelism
    ///
    /// # Errors
    /// * `InvalidParameters` - Argon2 rejected the combination
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;
        Ok(Self {
            params,
            decoy: Arc::new(OnceLock::new()),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `TooLong` - Plaintext exceeds `MAX_PASSWORD_BYTES`
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.len() > Self::MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong {
                max: Self::MAX_PASSWORD_BYTES,
                actual: password.len(),
            });
        }

        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Returns false for a wrong password, an oversized password, an empty
    /// hash (accounts without a password) and a malformed hash alike.
    /// The last two are checked against the decoy digest, so they take as
    /// long as a wrong password.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.len() > Self::MAX_PASSWORD_BYTES {
            return false;
        }

        match PasswordHash::new(hash) {
            Ok(parsed_hash) => self.verify_parsed(password, &parsed_hash),
            Err(_) => {
                self.verify_decoy(password);
                false
            }
        }
    }

    /// Run one verification against the decoy digest and discard the result,
    /// for callers with no digest to check (unknown account).
    pub fn verify_decoy(&self, password: &str) {
        if let Ok(parsed_hash) = PasswordHash::new(self.decoy_hash()) {
            let _ = self.verify_parsed(password, &parsed_hash);
        }
    }

    /// Decoy digest built with this hasher's cost. Computed on first use and
    /// shared between clones.
    pub fn decoy_hash(&self) -> &str {
        self.decoy
            .get_or_init(|| self.hash(DECOY_PASSWORD).unwrap_or_default())
    }

    /// Whether the decoy digest has been computed yet.
    pub fn has_decoy_hash(&self) -> bool {
        self.decoy.get().is_some()
    }

    fn verify_parsed(&self, password: &str, parsed_hash: &PasswordHash<'_>) -> bool {
        // Cost parameters are read from the digest, not from `self.params`.
        self.argon2()
            .verify_password(password.as_bytes(), parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
