use thiserror::Error;

use crate::common::validation::ValidationErrors;
use crate::domains::auth::{PasswordError, TokenError};
use crate::kernel::StoreError;

/// Failures of the member actions.
#[derive(Error, Debug)]
pub enum MemberError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("invalid authentication credentials")]
    InvalidCredentials,

    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(TokenError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for MemberError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EditConflict => MemberError::EditConflict,
            StoreError::DuplicateIdentity { field } => MemberError::Validation(
                ValidationErrors::single(field, "a member with this email address already exists"),
            ),
            other => MemberError::Store(other),
        }
    }
}

impl From<TokenError> for MemberError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Store(e) => e.into(),
            other => MemberError::Token(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_identity_becomes_field_error() {
        let err: MemberError = StoreError::DuplicateIdentity { field: "email" }.into();
        match err {
            MemberError::Validation(v) => assert_eq!(
                v.get("email"),
                Some("a member with this email address already exists")
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_conflict_stays_distinct() {
        let err: MemberError = StoreError::EditConflict.into();
        assert!(matches!(err, MemberError::EditConflict));

        let err: MemberError = TokenError::Store(StoreError::NotFound).into();
        assert!(matches!(err, MemberError::Store(StoreError::NotFound)));
    }
}
