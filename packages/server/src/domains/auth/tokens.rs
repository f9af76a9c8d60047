//! Scoped, hashed, expiring bearer tokens.
//!
//! The plaintext is handed to the caller once by [`TokenAuthority::issue`] and
//! never stored: the database only holds its SHA-256 digest, so a leaked table
//! yields no usable tokens.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::common::validation::ValidationErrors;
use crate::common::MemberId;
use crate::domains::member::Member;
use crate::kernel::{BaseMemberStore, BaseTokenStore, StoreError};

/// Random bytes per token.
pub const TOKEN_ENTROPY_BYTES: usize = 32;

/// Plaintext length: the random bytes, hex-encoded.
pub const TOKEN_PLAINTEXT_LEN: usize = TOKEN_ENTROPY_BYTES * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    Activation,
    Authentication,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Activation => "activation",
            TokenScope::Authentication => "authentication",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stored form of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub hash: Vec<u8>,
    pub member_id: MemberId,
    pub scope: TokenScope,
    pub expiry: DateTime<Utc>,
}

/// A freshly issued token; the only place the plaintext ever exists.
#[derive(Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("failed to gather token entropy: {0}")]
    Entropy(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// SHA-256 of the plaintext.
pub fn hash_token(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

/// `true` when `plaintext` has the issued shape (64 lowercase hex chars).
pub fn is_well_formed(plaintext: &str) -> bool {
    plaintext.len() == TOKEN_PLAINTEXT_LEN
        && plaintext
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

pub fn validate_token_plaintext(v: &mut ValidationErrors, plaintext: &str) {
    v.check(!plaintext.is_empty(), "token", "must be provided");
    v.check(
        plaintext.len() == TOKEN_PLAINTEXT_LEN,
        "token",
        "must be 64 bytes long",
    );
    v.check(
        is_well_formed(plaintext),
        "token",
        "must contain only lowercase hexadecimal characters",
    );
}

fn generate_plaintext() -> Result<String, TokenError> {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| TokenError::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Issues, resolves and revokes tokens.
#[derive(Clone)]
pub struct TokenAuthority {
    tokens: Arc<dyn BaseTokenStore>,
    members: Arc<dyn BaseMemberStore>,
}

impl TokenAuthority {
    pub fn new(tokens: Arc<dyn BaseTokenStore>, members: Arc<dyn BaseMemberStore>) -> Self {
        Self { tokens, members }
    }

    /// Create a token for `member_id` valid for `ttl`.
    ///
    /// A zero (or negative) `ttl` produces a token that is already expired.
    pub async fn issue(
        &self,
        member_id: MemberId,
        ttl: Duration,
        scope: TokenScope,
    ) -> Result<IssuedToken, TokenError> {
        let plaintext = generate_plaintext()?;
        let record = TokenRecord {
            hash: hash_token(&plaintext),
            member_id,
            scope,
            expiry: Utc::now() + ttl,
        };

        self.tokens.insert(&record).await?;
        debug!(member_id = %member_id, scope = %scope, expiry = %record.expiry, "token issued");

        Ok(IssuedToken {
            token: plaintext,
            expiry: record.expiry,
        })
    }

    /// Member holding an unexpired `scope` token matching `plaintext`.
    ///
    /// Unknown, expired and wrong-scope tokens all fail with the same
    /// `StoreError::NotFound`.
    pub async fn resolve(&self, scope: TokenScope, plaintext: &str) -> Result<Member, StoreError> {
        let hash = hash_token(plaintext);
        self.members.find_for_token(scope, &hash, Utc::now()).await
    }

    /// Delete every `scope` token held by `member_id`.
    pub async fn revoke_all(
        &self,
        scope: TokenScope,
        member_id: MemberId,
    ) -> Result<u64, StoreError> {
        let removed = self.tokens.delete_all_for_member(scope, member_id).await?;
        debug!(member_id = %member_id, scope = %scope, removed, "tokens revoked");
        Ok(removed)
    }
}
