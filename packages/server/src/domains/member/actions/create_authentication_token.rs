//! Login action - exchanges e-mail and password for an authentication token

use secrecy::SecretString;
use tracing::{debug, info};

use crate::common::validation::{validate_email, ValidationErrors};
use crate::domains::auth::{validate_password_plaintext, IssuedToken, TokenScope};
use crate::domains::member::{normalize_email, MemberError};
use crate::kernel::{ServerDeps, StoreError};

/// Issue an authentication token for the member identified by `email`.
///
/// Unknown e-mail and wrong password both fail with `InvalidCredentials`, and
/// both pay for one password hash so response timing does not reveal which.
/// Inactive members may log in; activation is enforced per route.
pub async fn create_authentication_token(
    email: &str,
    password: SecretString,
    deps: &ServerDeps,
) -> Result<IssuedToken, MemberError> {
    let email = normalize_email(email);

    let mut v = ValidationErrors::new();
    validate_email(&mut v, &email);
    validate_password_plaintext(&mut v, &password);
    v.into_result()?;

    let member = match deps.members.find_by_email(&email).await {
        Ok(member) => member,
        Err(StoreError::NotFound) => {
            deps.hasher.hash_blocking(password).await?;
            debug!("login for unknown email");
            return Err(MemberError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    let matches = deps
        .hasher
        .verify_blocking(member.password_hash.clone(), password)
        .await?;
    if !matches {
        debug!(member_id = %member.id, "login with wrong password");
        return Err(MemberError::InvalidCredentials);
    }

    let token = deps
        .token_authority()
        .issue(
            member.id,
            deps.token_ttls.authentication,
            TokenScope::Authentication,
        )
        .await?;

    info!(member_id = %member.id, "authentication token issued");
    Ok(token)
}
