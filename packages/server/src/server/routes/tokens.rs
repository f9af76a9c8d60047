use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domains::auth::{secret, IssuedToken};
use crate::domains::member::actions::create_authentication_token;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
pub struct CreateAuthenticationTokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthenticationTokenResponse {
    pub authentication_token: IssuedToken,
}

/// POST /api/v1/tokens/authentication
pub async fn create_authentication_token_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateAuthenticationTokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthenticationTokenResponse>), ApiError> {
    let Json(request) = payload?;
    let authentication_token =
        create_authentication_token(&request.email, secret(request.password), &state.deps).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthenticationTokenResponse {
            authentication_token,
        }),
    ))
}
