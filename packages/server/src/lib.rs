// Dishes API - Core
//
// Member accounts, bearer-token authentication, capability-based
// authorization, and the shared list engine behind every catalogue endpoint.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
