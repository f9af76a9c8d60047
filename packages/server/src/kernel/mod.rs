//! Kernel module - persistence seams and server dependencies.

pub mod deps;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod test_dependencies;
pub mod timeout;
pub mod traits;

pub use deps::{ServerDeps, TokenTtls};
pub use error::StoreError;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use test_dependencies::TestDependencies;
pub use timeout::{bounded, DEFAULT_STORE_TIMEOUT};
pub use traits::*;
