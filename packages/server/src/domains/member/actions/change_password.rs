//! Change password action - replaces the credential and ends every session

use secrecy::SecretString;
use tracing::{info, warn};

use crate::common::validation::ValidationErrors;
use crate::domains::auth::{validate_password_plaintext, TokenScope};
use crate::domains::member::{Member, MemberError};
use crate::kernel::ServerDeps;

#[derive(Debug)]
pub struct ChangePassword {
    pub current_password: SecretString,
    pub new_password: SecretString,
}

/// Replace `member`'s password.
///
/// `member` is the copy loaded while authenticating this request; the update
/// is a compare-and-swap against its version, so a concurrent change wins and
/// this call fails with `EditConflict`. All authentication tokens are revoked
/// afterwards, including the one used for this request.
///
/// The new password is committed before revocation runs. A failed revocation
/// is logged and the change still succeeds; sessions then end at their expiry.
pub async fn change_password(
    mut member: Member,
    input: ChangePassword,
    deps: &ServerDeps,
) -> Result<Member, MemberError> {
    let ChangePassword {
        current_password,
        new_password,
    } = input;

    let mut v = ValidationErrors::new();
    validate_password_plaintext(&mut v, &new_password);
    v.into_result()?;

    let matches = deps
        .hasher
        .verify_blocking(member.password_hash.clone(), current_password)
        .await?;
    if !matches {
        return Err(ValidationErrors::single("current_password", "is incorrect").into());
    }

    member.password_hash = deps.hasher.hash_blocking(new_password).await?;
    deps.members.update(&mut member).await?;

    match deps
        .token_authority()
        .revoke_all(TokenScope::Authentication, member.id)
        .await
    {
        Ok(revoked) => info!(member_id = %member.id, revoked, "password changed"),
        Err(error) => warn!(
            member_id = %member.id,
            error = %error,
            "password changed but authentication tokens were not revoked"
        ),
    }
    Ok(member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::common::MemberId;
    use crate::domains::auth::{secret, IssuedToken, TokenRecord};
    use crate::domains::member::actions::{
        activate_member, create_authentication_token, register_member, RegisterMember,
    };
    use crate::kernel::{BaseTokenStore, ServerDeps, StoreError, TestDependencies};

    /// Token store whose every call times out.
    struct UnreachableTokens;

    #[async_trait]
    impl BaseTokenStore for UnreachableTokens {
        async fn insert(&self, _token: &TokenRecord) -> Result<(), StoreError> {
            Err(StoreError::Timeout {
                operation: "tokens.insert",
                after: Duration::ZERO,
            })
        }

        async fn delete_all_for_member(
            &self,
            _scope: TokenScope,
            _member_id: MemberId,
        ) -> Result<u64, StoreError> {
            Err(StoreError::Timeout {
                operation: "tokens.delete_all_for_member",
                after: Duration::ZERO,
            })
        }
    }

    async fn active_member(test: &TestDependencies) -> Member {
        let registration = register_member(
            RegisterMember {
                name: "Dana".into(),
                email: "dana@example.com".into(),
                password: secret("old-password".into()),
            },
            &test.deps,
        )
        .await
        .unwrap();
        activate_member(&registration.activation_token.token, &test.deps)
            .await
            .unwrap()
    }

    async fn login(deps: &ServerDeps, password: &str) -> Result<IssuedToken, MemberError> {
        create_authentication_token("dana@example.com", secret(password.into()), deps).await
    }

    fn input(current: &str, new: &str) -> ChangePassword {
        ChangePassword {
            current_password: secret(current.into()),
            new_password: secret(new.into()),
        }
    }

    #[tokio::test]
    async fn test_change_password_revokes_sessions() {
        let test = TestDependencies::new();
        let member = active_member(&test).await;
        let session = login(&test.deps, "old-password").await.unwrap();

        let updated = change_password(member, input("old-password", "new-password"), &test.deps)
            .await
            .unwrap();
        assert_eq!(updated.version, 3);

        let resolved = test
            .deps
            .token_authority()
            .resolve(TokenScope::Authentication, &session.token)
            .await;
        assert!(resolved.is_err());

        assert!(login(&test.deps, "new-password").await.is_ok());
        assert!(matches!(
            login(&test.deps, "old-password").await,
            Err(MemberError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_wrong_current_password() {
        let test = TestDependencies::new();
        let member = active_member(&test).await;

        let err = change_password(member, input("not-the-password", "new-password"), &test.deps)
            .await
            .unwrap_err();
        match err {
            MemberError::Validation(v) => {
                assert_eq!(v.get("current_password"), Some("is incorrect"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_copy_is_edit_conflict() {
        let test = TestDependencies::new();
        let member = active_member(&test).await;
        let stale = member.clone();

        change_password(member, input("old-password", "new-password"), &test.deps)
            .await
            .unwrap();

        let err = change_password(stale, input("old-password", "third-password"), &test.deps)
            .await
            .unwrap_err();
        assert!(matches!(err, MemberError::EditConflict));
    }

    #[tokio::test]
    async fn test_failed_revocation_still_commits_password() {
        let test = TestDependencies::new();
        let member = active_member(&test).await;

        let deps = ServerDeps {
            tokens: Arc::new(UnreachableTokens),
            ..test.deps.clone()
        };
        let updated = change_password(member, input("old-password", "new-password"), &deps)
            .await
            .unwrap();

        let stored = test.store.member(updated.id).unwrap();
        assert_eq!(stored.version, updated.version);
        assert!(login(&test.deps, "new-password").await.is_ok());
        assert!(login(&test.deps, "old-password").await.is_err());
    }
}
