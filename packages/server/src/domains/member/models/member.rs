use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::validation::{validate_email, ValidationErrors};
use crate::common::MemberId;
use crate::domains::auth::PasswordDigest;

pub const MAX_NAME_BYTES: usize = 500;

/// Member model - a registered account
///
/// `password_hash` and `version` never leave the server.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: PasswordDigest,
    pub activated: bool,
    #[serde(skip_serializing)]
    pub version: i32,
}

/// Fields supplied at registration; id, timestamps and version are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub password_hash: PasswordDigest,
    pub activated: bool,
}

/// Lower-cased, trimmed e-mail used as the unique key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_name(v: &mut ValidationErrors, name: &str) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(
        name.len() <= MAX_NAME_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );
}

/// Profile fields shared by registration and updates.
pub fn validate_member_fields(v: &mut ValidationErrors, name: &str, email: &str) {
    validate_name(v, name);
    validate_email(v, email);
}
