//! JSON error responses.
//!
//! Every failure leaves the server as
//! `{"error": {"code": "...", "message": "...", "fields": {...}}}`, with
//! `fields` present only for validation failures.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::common::auth::AuthError;
use crate::common::validation::ValidationErrors;
use crate::domains::category::CategoryError;
use crate::domains::dish::DishError;
use crate::domains::member::MemberError;
use crate::kernel::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("the requested resource could not be found")]
    NotFound,

    #[error("one or more fields failed validation")]
    Validation(ValidationErrors),

    #[error("invalid or missing authentication token")]
    InvalidCredential,

    #[error("invalid authentication credentials")]
    InvalidCredentials,

    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("your user account must be activated to access this resource")]
    InactiveAccount,

    #[error("your user account doesn't have the necessary permissions to access this resource")]
    NotPermitted,

    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    #[error("the server is temporarily unable to complete the request")]
    StoreTimeout(#[source] StoreError),

    #[error("the server encountered a problem and could not process your request")]
    Internal(#[source] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a ValidationErrors>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidCredential
            | ApiError::InvalidCredentials
            | ApiError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ApiError::InactiveAccount | ApiError::NotPermitted => StatusCode::FORBIDDEN,
            ApiError::EditConflict => StatusCode::CONFLICT,
            ApiError::StoreTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound => "not_found",
            ApiError::Validation(_) => "validation_failed",
            ApiError::InvalidCredential => "invalid_credential",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::AuthenticationRequired => "authentication_required",
            ApiError::InactiveAccount => "inactive_account",
            ApiError::NotPermitted => "not_permitted",
            ApiError::EditConflict => "edit_conflict",
            ApiError::StoreTimeout(_) => "store_timeout",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = ?self, code = self.code(), "request failed");
        }

        let fields = match &self {
            ApiError::Validation(errors) => Some(errors),
            _ => None,
        };
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
                fields,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EditConflict => ApiError::EditConflict,
            StoreError::DuplicateIdentity { field } => ApiError::Validation(
                ValidationErrors::single(field, "a record with this value already exists"),
            ),
            StoreError::Timeout { .. } => ApiError::StoreTimeout(err),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredential => ApiError::InvalidCredential,
            AuthError::AuthenticationRequired => ApiError::AuthenticationRequired,
            AuthError::InactiveAccount => ApiError::InactiveAccount,
            AuthError::NotPermitted { .. } => ApiError::NotPermitted,
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<MemberError> for ApiError {
    fn from(err: MemberError) -> Self {
        match err {
            MemberError::Validation(errors) => ApiError::Validation(errors),
            MemberError::InvalidCredentials => ApiError::InvalidCredentials,
            MemberError::EditConflict => ApiError::EditConflict,
            MemberError::Store(e) => e.into(),
            MemberError::Password(e) => ApiError::Internal(e.into()),
            MemberError::Token(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::Validation(errors) => ApiError::Validation(errors),
            CategoryError::NotFound => ApiError::NotFound,
            CategoryError::Store(e) => e.into(),
        }
    }
}

impl From<DishError> for ApiError {
    fn from(err: DishError) -> Self {
        match err {
            DishError::Validation(errors) => ApiError::Validation(errors),
            DishError::NotFound => ApiError::NotFound,
            DishError::Store(e) => e.into(),
        }
    }
}

/// Non-numeric ids name no resource.
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
