// TestDependencies - in-memory wiring for tests
//
// Provides a ServerDeps backed by one InMemoryStore and a deliberately cheap
// password hasher, plus a handle on the store for assertions.

use std::sync::Arc;

use super::{InMemoryStore, ServerDeps, TokenTtls};
use crate::domains::auth::{CredentialHasher, HashingCost};

/// Minimal Argon2 cost; production cost comes from config.
pub const TEST_HASHING_COST: HashingCost = HashingCost {
    iterations: 1,
    memory_kib: 64,
    parallelism: 1,
};

pub struct TestDependencies {
    pub store: Arc<InMemoryStore>,
    pub deps: ServerDeps,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self::with_token_ttls(TokenTtls::default())
    }

    pub fn with_token_ttls(token_ttls: TokenTtls) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let hasher = CredentialHasher::new(TEST_HASHING_COST).expect("valid test hashing cost");
        let deps = ServerDeps::in_memory(store.clone(), hasher, token_ttls);
        Self { store, deps }
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
