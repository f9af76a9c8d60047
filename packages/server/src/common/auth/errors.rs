use thiserror::Error;

use crate::kernel::StoreError;

/// Failures of the authorization chain
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid or missing authentication token")]
    InvalidCredential,

    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("your user account must be activated to access this resource")]
    InactiveAccount,

    #[error("your user account doesn't have the necessary permissions to access this resource")]
    NotPermitted { capability: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}
