// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod filters;
pub mod id;
pub mod validation;

pub use auth::{AuthError, Capability, Identity, Permissions};
pub use entity_ids::*;
pub use filters::{Filters, ListParams, Metadata, Page, Sort, SortDirection, SortSafelist};
pub use id::Id;
pub use validation::ValidationErrors;
