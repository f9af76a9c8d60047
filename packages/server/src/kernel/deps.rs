//! Server dependencies for actions and handlers (using traits for testability)
//!
//! This module provides the central dependency container used by every domain action.
//! All persistence goes through trait objects so tests can swap in the in-memory store.

use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::auth::{CredentialHasher, TokenAuthority};
use crate::kernel::memory::InMemoryStore;
use crate::kernel::postgres::PostgresStore;
use crate::kernel::{
    BaseCategoryStore, BaseDishStore, BaseMemberStore, BasePermissionStore, BaseTokenStore,
};

/// Lifetimes of the two token scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtls {
    pub activation: Duration,
    pub authentication: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            activation: Duration::days(3),
            authentication: Duration::minutes(60),
        }
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub members: Arc<dyn BaseMemberStore>,
    pub tokens: Arc<dyn BaseTokenStore>,
    pub permissions: Arc<dyn BasePermissionStore>,
    pub categories: Arc<dyn BaseCategoryStore>,
    pub dishes: Arc<dyn BaseDishStore>,
    pub hasher: CredentialHasher,
    pub token_ttls: TokenTtls,
}

impl ServerDeps {
    pub fn new(
        members: Arc<dyn BaseMemberStore>,
        tokens: Arc<dyn BaseTokenStore>,
        permissions: Arc<dyn BasePermissionStore>,
        categories: Arc<dyn BaseCategoryStore>,
        dishes: Arc<dyn BaseDishStore>,
        hasher: CredentialHasher,
        token_ttls: TokenTtls,
    ) -> Self {
        Self {
            members,
            tokens,
            permissions,
            categories,
            dishes,
            hasher,
            token_ttls,
        }
    }

    /// Every store backed by one Postgres pool.
    pub fn postgres(
        pool: PgPool,
        store_timeout: std::time::Duration,
        hasher: CredentialHasher,
        token_ttls: TokenTtls,
    ) -> Self {
        let store = Arc::new(PostgresStore::new(pool, store_timeout));
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            hasher,
            token_ttls,
        )
    }

    /// Every store backed by one shared in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryStore>,
        hasher: CredentialHasher,
        token_ttls: TokenTtls,
    ) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            hasher,
            token_ttls,
        )
    }

    pub fn token_authority(&self) -> TokenAuthority {
        TokenAuthority::new(self.tokens.clone(), self.members.clone())
    }
}
