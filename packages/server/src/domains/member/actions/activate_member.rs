//! Activate member action - redeems an activation token

use tracing::info;

use crate::common::validation::ValidationErrors;
use crate::domains::auth::{validate_token_plaintext, TokenScope};
use crate::domains::member::{Member, MemberError};
use crate::kernel::{ServerDeps, StoreError};

/// Activate the member holding `token`.
///
/// Unknown, expired and wrong-scope tokens are all a field error on `token`.
/// On success every activation token of the member is revoked.
pub async fn activate_member(token: &str, deps: &ServerDeps) -> Result<Member, MemberError> {
    let mut v = ValidationErrors::new();
    validate_token_plaintext(&mut v, token);
    v.into_result()?;

    let authority = deps.token_authority();
    let mut member = match authority.resolve(TokenScope::Activation, token).await {
        Ok(member) => member,
        Err(StoreError::NotFound) => {
            return Err(
                ValidationErrors::single("token", "invalid or expired activation token").into(),
            )
        }
        Err(e) => return Err(e.into()),
    };

    member.activated = true;
    deps.members.update(&mut member).await?;

    authority
        .revoke_all(TokenScope::Activation, member.id)
        .await?;

    info!(member_id = %member.id, "member activated");
    Ok(member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::secret;
    use crate::domains::member::actions::{register_member, RegisterMember};
    use crate::kernel::TestDependencies;

    async fn registered(test: &TestDependencies) -> String {
        register_member(
            RegisterMember {
                name: "Bob".into(),
                email: "bob@example.com".into(),
                password: secret("pa55word-long".into()),
            },
            &test.deps,
        )
        .await
        .unwrap()
        .activation_token
        .token
    }

    fn token_field_error(err: MemberError) -> String {
        match err {
            MemberError::Validation(v) => v.get("token").unwrap_or_default().to_string(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_activation_sets_flag_and_bumps_version() {
        let test = TestDependencies::new();
        let token = registered(&test).await;

        let member = activate_member(&token, &test.deps).await.unwrap();
        assert!(member.activated);
        assert_eq!(member.version, 2);
        assert!(test.store.token_records().is_empty());
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        let test = TestDependencies::new();
        let token = registered(&test).await;
        activate_member(&token, &test.deps).await.unwrap();

        let err = activate_member(&token, &test.deps).await.unwrap_err();
        assert_eq!(token_field_error(err), "invalid or expired activation token");
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_tokens() {
        let test = TestDependencies::new();

        let err = activate_member("abc", &test.deps).await.unwrap_err();
        assert_eq!(token_field_error(err), "must be 64 bytes long");

        let err = activate_member(&"0".repeat(64), &test.deps)
            .await
            .unwrap_err();
        assert_eq!(token_field_error(err), "invalid or expired activation token");
    }

    #[tokio::test]
    async fn test_authentication_token_cannot_activate() {
        let test = TestDependencies::new();
        let token = registered(&test).await;
        let member = activate_member(&token, &test.deps).await.unwrap();

        let auth = test
            .deps
            .token_authority()
            .issue(member.id, chrono::Duration::hours(1), TokenScope::Authentication)
            .await
            .unwrap();

        let err = activate_member(&auth.token, &test.deps).await.unwrap_err();
        assert_eq!(token_field_error(err), "invalid or expired activation token");
    }
}
