use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use password_hash::SaltString;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use thiserror::Error;

use crate::common::validation::ValidationErrors;

pub const MIN_PASSWORD_BYTES: usize = 8;
pub const MAX_PASSWORD_BYTES: usize = 72;

const SALT_BYTES: usize = 16;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    HashingFailure(String),

    #[error("stored password hash is malformed: {0}")]
    VerificationFailure(String),
}

/// Work factor for the password hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    pub iterations: u32,
    pub memory_kib: u32,
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            iterations: 3,
            memory_kib: 19 * 1024,
            parallelism: 1,
        }
    }
}

/// A PHC-format hash (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`).
///
/// The algorithm, cost and salt travel inside the string, so verification
/// does not depend on the hasher's current cost.
#[derive(Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest([REDACTED])")
    }
}

/// Salted Argon2id password hashing.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new(cost: HashingCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::HashingFailure(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `plaintext`, consuming it so the secret is zeroized on return.
    pub fn hash(&self, plaintext: SecretString) -> Result<PasswordDigest, PasswordError> {
        let mut salt_bytes = [0u8; SALT_BYTES];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| PasswordError::HashingFailure(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| PasswordError::HashingFailure(e.to_string()))?;

        let phc = self
            .argon2
            .hash_password(plaintext.expose_secret().as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailure(e.to_string()))?
            .to_string();

        Ok(PasswordDigest(phc))
    }

    /// `Ok(false)` on mismatch; `Err` only when `digest` cannot be parsed.
    pub fn verify(
        &self,
        digest: &PasswordDigest,
        plaintext: &SecretString,
    ) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(digest.as_str())
            .map_err(|e| PasswordError::VerificationFailure(e.to_string()))?;

        match self
            .argon2
            .verify_password(plaintext.expose_secret().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerificationFailure(e.to_string())),
        }
    }

    /// [`hash`](Self::hash) on the blocking pool; Argon2 is CPU-bound by design.
    pub async fn hash_blocking(
        &self,
        plaintext: SecretString,
    ) -> Result<PasswordDigest, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(plaintext))
            .await
            .map_err(|e| PasswordError::HashingFailure(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(
        &self,
        digest: PasswordDigest,
        plaintext: SecretString,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&digest, &plaintext))
            .await
            .map_err(|e| PasswordError::VerificationFailure(e.to_string()))?
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

/// Password must be present and between 8 and 72 bytes.
pub fn validate_password_plaintext(v: &mut ValidationErrors, plaintext: &SecretString) {
    let len = plaintext.expose_secret().len();
    v.check(len > 0, "password", "must be provided");
    v.check(
        len >= MIN_PASSWORD_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        len <= MAX_PASSWORD_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

/// Wrap a decoded request field.
pub fn secret(plaintext: String) -> SecretString {
    SecretString::new(plaintext.into_boxed_str())
}
