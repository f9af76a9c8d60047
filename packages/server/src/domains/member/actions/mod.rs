//! Member domain actions - business logic functions
//!
//! Each action validates its input, drives the stores through `ServerDeps`,
//! and returns a `MemberError` the HTTP layer knows how to render.

mod activate_member;
mod change_password;
mod create_authentication_token;
mod register_member;
mod update_profile;

pub use activate_member::activate_member;
pub use change_password::{change_password, ChangePassword};
pub use create_authentication_token::create_authentication_token;
pub use register_member::{register_member, RegisterMember, Registration, DEFAULT_PERMISSIONS};
pub use update_profile::{update_profile, UpdateProfile};
