//! Member domain - registration, activation, login and account changes
//!
//! Actions take `&ServerDeps` and return `MemberError`; handlers map the
//! error onto an HTTP status.

pub mod actions;
pub mod errors;
pub mod models;

pub use errors::MemberError;
pub use models::{normalize_email, validate_member_fields, Member, NewMember};
