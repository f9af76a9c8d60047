pub mod member;

pub use member::{
    normalize_email, validate_member_fields, validate_name, Member, NewMember, MAX_NAME_BYTES,
};
