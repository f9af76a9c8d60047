//! Register member action - creates an inactive account and its activation token

use secrecy::SecretString;
use serde::Serialize;
use tracing::info;

use crate::common::auth::Capability;
use crate::common::validation::ValidationErrors;
use crate::domains::auth::{validate_password_plaintext, IssuedToken, TokenScope};
use crate::domains::member::models::{normalize_email, validate_member_fields, Member, NewMember};
use crate::domains::member::MemberError;
use crate::kernel::ServerDeps;

/// Permissions every new member starts with.
pub const DEFAULT_PERMISSIONS: &[&str] = &[Capability::DishesRead.code()];

#[derive(Debug)]
pub struct RegisterMember {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

/// A new member and the one-time plaintext of their activation token.
#[derive(Debug, Serialize)]
pub struct Registration {
    pub member: Member,
    pub activation_token: IssuedToken,
}

/// Register a new member.
///
/// This action:
/// 1. Validates name, e-mail and password
/// 2. Hashes the password off the async runtime
/// 3. Inserts the member (inactive) and grants the default permissions
/// 4. Issues an activation token
///
/// A taken e-mail is reported as a field error on `email`.
pub async fn register_member(
    input: RegisterMember,
    deps: &ServerDeps,
) -> Result<Registration, MemberError> {
    let RegisterMember {
        name,
        email,
        password,
    } = input;
    let email = normalize_email(&email);

    let mut v = ValidationErrors::new();
    validate_member_fields(&mut v, &name, &email);
    validate_password_plaintext(&mut v, &password);
    v.into_result()?;

    let password_hash = deps.hasher.hash_blocking(password).await?;

    let member = deps
        .members
        .insert(NewMember {
            name,
            email,
            password_hash,
            activated: false,
        })
        .await?;

    deps.permissions
        .add_for_member(member.id, DEFAULT_PERMISSIONS)
        .await?;

    let activation_token = deps
        .token_authority()
        .issue(member.id, deps.token_ttls.activation, TokenScope::Activation)
        .await?;

    info!(member_id = %member.id, "member registered");

    Ok(Registration {
        member,
        activation_token,
    })
}
