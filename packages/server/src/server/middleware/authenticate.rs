use axum::extract::State;
use axum::http::header::{AUTHORIZATION, VARY};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::{body::Body, middleware::Next, response::Response};
use tracing::debug;

use crate::common::auth::{AuthError, Identity};
use crate::domains::auth::{is_well_formed, TokenAuthority, TokenScope};
use crate::kernel::StoreError;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Bearer token from the `Authorization` header.
///
/// `Ok(None)` when the header is absent. Anything other than exactly
/// `Bearer <64 lowercase hex chars>` is `InvalidCredential`.
pub fn parse_bearer(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidCredential)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if is_well_formed(token) => Ok(Some(*token)),
        _ => Err(AuthError::InvalidCredential),
    }
}

/// Resolve the caller's identity. Malformed headers never reach the store.
pub async fn resolve_identity(
    headers: &HeaderMap,
    authority: &TokenAuthority,
) -> Result<Identity, AuthError> {
    let Some(token) = parse_bearer(headers)? else {
        return Ok(Identity::Anonymous);
    };

    match authority.resolve(TokenScope::Authentication, token).await {
        Ok(member) => {
            debug!(member_id = %member.id, "authenticated request");
            Ok(Identity::Authenticated(member))
        }
        Err(StoreError::NotFound) => Err(AuthError::InvalidCredential),
        Err(e) => Err(e.into()),
    }
}

/// Resolve the caller once per request and hand the [`Identity`] to the
/// extractors through the request extensions.
///
/// Runs on every route, public ones included: a present `Authorization`
/// header that is malformed or names no live token fails the request with
/// `invalid_credential` before any handler runs.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = resolve_identity(request.headers(), &state.deps.token_authority()).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Responses vary by caller, so shared caches must key on the header.
pub async fn vary_authorization(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .append(VARY, HeaderValue::from_static("Authorization"));
    response
}
