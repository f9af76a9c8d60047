//! Update profile action - name and e-mail changes

use tracing::info;

use crate::common::validation::ValidationErrors;
use crate::domains::member::{normalize_email, validate_member_fields, Member, MemberError};
use crate::kernel::ServerDeps;

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Apply `input` to `member` with a compare-and-swap on its version.
///
/// Another writer advancing the version first yields `EditConflict`; an
/// e-mail owned by someone else yields a field error on `email`.
pub async fn update_profile(
    mut member: Member,
    input: UpdateProfile,
    deps: &ServerDeps,
) -> Result<Member, MemberError> {
    if let Some(name) = input.name {
        member.name = name;
    }
    if let Some(email) = input.email {
        member.email = normalize_email(&email);
    }

    let mut v = ValidationErrors::new();
    validate_member_fields(&mut v, &member.name, &member.email);
    v.into_result()?;

    deps.members.update(&mut member).await?;

    info!(member_id = %member.id, version = member.version, "member profile updated");
    Ok(member)
}
