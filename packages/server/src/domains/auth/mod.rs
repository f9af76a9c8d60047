//! Auth domain - credentials and bearer tokens
//!
//! Responsibilities:
//! - Password hashing and verification (Argon2id)
//! - Token issuance, resolution and revocation, scoped by purpose

pub mod password;
pub mod tokens;

pub use password::{
    secret, validate_password_plaintext, CredentialHasher, HashingCost, PasswordDigest,
    PasswordError,
};
pub use tokens::{
    hash_token, is_well_formed, validate_token_plaintext, IssuedToken, TokenAuthority, TokenError,
    TokenRecord, TokenScope,
};
