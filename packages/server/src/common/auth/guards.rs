//! The authorization chain.
//!
//! Each step composes the previous one, so the first unmet requirement
//! decides the error: anonymous, then inactive, then missing permission.

use super::{AuthError, Capability, Identity};
use crate::domains::member::Member;
use crate::kernel::BasePermissionStore;

pub fn require_authenticated(identity: Identity) -> Result<Member, AuthError> {
    match identity {
        Identity::Anonymous => Err(AuthError::AuthenticationRequired),
        Identity::Authenticated(member) => Ok(member),
    }
}

pub fn require_activated(identity: Identity) -> Result<Member, AuthError> {
    let member = require_authenticated(identity)?;
    if !member.activated {
        return Err(AuthError::InactiveAccount);
    }
    Ok(member)
}

/// Permissions are loaded fresh on every call.
pub async fn require_permission(
    identity: Identity,
    capability: Capability,
    permissions: &dyn BasePermissionStore,
) -> Result<Member, AuthError> {
    let member = require_activated(identity)?;

    let granted = permissions.all_for_member(member.id).await?;
    if !granted.include(capability.code()) {
        tracing::debug!(member_id = %member.id, %capability, "permission denied");
        return Err(AuthError::NotPermitted {
            capability: capability.code(),
        });
    }

    Ok(member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::PasswordDigest;
    use crate::domains::member::NewMember;
    use crate::kernel::memory::InMemoryStore;

    fn member(store: &InMemoryStore, email: &str, activated: bool) -> Member {
        store
            .insert_member(NewMember {
                name: "Guarded".into(),
                email: email.into(),
                password_hash: PasswordDigest::from_phc("$argon2id$placeholder"),
                activated,
            })
            .unwrap()
    }

    #[test]
    fn test_anonymous_is_authentication_required() {
        assert!(matches!(
            require_authenticated(Identity::Anonymous),
            Err(AuthError::AuthenticationRequired)
        ));
        assert!(matches!(
            require_activated(Identity::Anonymous),
            Err(AuthError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_inactive_member_passes_authentication_only() {
        let store = InMemoryStore::new();
        let inactive = member(&store, "inactive@example.com", false);

        assert!(require_authenticated(Identity::Authenticated(inactive.clone())).is_ok());
        assert!(matches!(
            require_activated(Identity::Authenticated(inactive)),
            Err(AuthError::InactiveAccount)
        ));
    }

    #[tokio::test]
    async fn test_chain_ordering() {
        let store = InMemoryStore::new();
        let inactive = member(&store, "inactive@example.com", false);
        let reader = member(&store, "reader@example.com", true);
        store
            .add_for_member(inactive.id, &["dishes:read", "dishes:write"])
            .await
            .unwrap();
        store.add_for_member(reader.id, &["dishes:read"]).await.unwrap();

        let anonymous =
            require_permission(Identity::Anonymous, Capability::DishesRead, &store).await;
        assert!(matches!(anonymous, Err(AuthError::AuthenticationRequired)));

        // Inactive wins over a held permission.
        let inactive =
            require_permission(Identity::Authenticated(inactive), Capability::DishesWrite, &store)
                .await;
        assert!(matches!(inactive, Err(AuthError::InactiveAccount)));

        let denied = require_permission(
            Identity::Authenticated(reader.clone()),
            Capability::DishesWrite,
            &store,
        )
        .await;
        assert!(matches!(
            denied,
            Err(AuthError::NotPermitted {
                capability: "dishes:write"
            })
        ));

        let allowed = require_permission(
            Identity::Authenticated(reader.clone()),
            Capability::DishesRead,
            &store,
        )
        .await
        .unwrap();
        assert_eq!(allowed.id, reader.id);
    }
}
