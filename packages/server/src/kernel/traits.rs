// Trait definitions for the persistence collaborators
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (register, activate, authorize) lives in domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseMemberStore, BaseTokenStore)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::StoreError;
use crate::common::auth::Permissions;
use crate::common::filters::{Filters, Page};
use crate::common::{CategoryId, DishId, MemberId};
use crate::domains::auth::{TokenRecord, TokenScope};
use crate::domains::category::{Category, NewCategory};
use crate::domains::dish::{Dish, DishFilter, NewDish};
use crate::domains::member::{Member, NewMember};

// =============================================================================
// Member Store
// =============================================================================

#[async_trait]
pub trait BaseMemberStore: Send + Sync {
    /// Insert a member; a taken e-mail fails with `DuplicateIdentity { field: "email" }`.
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Member, StoreError>;

    /// Member owning an unexpired token of `scope` whose hash is `token_hash`.
    async fn find_for_token(
        &self,
        scope: TokenScope,
        token_hash: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Member, StoreError>;

    /// Compare-and-swap update keyed on `(id, version)`.
    ///
    /// On success `member.version` holds the new version. A stale version fails
    /// with `EditConflict` and writes nothing.
    async fn update(&self, member: &mut Member) -> Result<(), StoreError>;

    /// Cheap liveness check for the healthcheck route.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// =============================================================================
// Token Store
// =============================================================================

#[async_trait]
pub trait BaseTokenStore: Send + Sync {
    async fn insert(&self, token: &TokenRecord) -> Result<(), StoreError>;

    /// Delete every token of `scope` held by `member_id`; returns the number removed.
    async fn delete_all_for_member(
        &self,
        scope: TokenScope,
        member_id: MemberId,
    ) -> Result<u64, StoreError>;
}

// =============================================================================
// Permission Store
// =============================================================================

#[async_trait]
pub trait BasePermissionStore: Send + Sync {
    async fn all_for_member(&self, member_id: MemberId) -> Result<Permissions, StoreError>;

    /// Grant existing permission codes; unknown codes are ignored.
    async fn add_for_member(&self, member_id: MemberId, codes: &[&str]) -> Result<(), StoreError>;
}

// =============================================================================
// Category Store
// =============================================================================

#[async_trait]
pub trait BaseCategoryStore: Send + Sync {
    async fn insert(&self, category: NewCategory) -> Result<Category, StoreError>;

    async fn find(&self, id: CategoryId) -> Result<Category, StoreError>;

    /// Categories whose name contains `name` (case-insensitive, empty matches all),
    /// ordered and windowed by `filters`.
    async fn list(&self, name: &str, filters: &Filters) -> Result<Page<Category>, StoreError>;

    /// Write name and description; refreshes `updated_at` in place.
    async fn update(&self, category: &mut Category) -> Result<(), StoreError>;

    /// `NotFound` when no row had this id.
    async fn delete(&self, id: CategoryId) -> Result<(), StoreError>;
}

// =============================================================================
// Dish Store
// =============================================================================

#[async_trait]
pub trait BaseDishStore: Send + Sync {
    async fn insert(&self, dish: NewDish) -> Result<Dish, StoreError>;

    async fn find(&self, id: DishId) -> Result<Dish, StoreError>;

    /// Dishes selected by `filter`, ordered and windowed by `filters`.
    async fn list(&self, filter: &DishFilter, filters: &Filters) -> Result<Page<Dish>, StoreError>;

    /// Write name, description and price; refreshes `updated_at` in place.
    async fn update(&self, dish: &mut Dish) -> Result<(), StoreError>;

    /// `NotFound` when no row had this id.
    async fn delete(&self, id: DishId) -> Result<(), StoreError>;
}
