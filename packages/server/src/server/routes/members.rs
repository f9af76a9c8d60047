use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domains::auth::secret;
use crate::domains::member::actions::{
    activate_member, change_password, register_member, update_profile, ChangePassword,
    RegisterMember, Registration, UpdateProfile,
};
use crate::domains::member::Member;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::{Activated, Authenticated};

#[derive(Deserialize)]
pub struct RegisterMemberRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct ActivateMemberRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct UpdateMemberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct MemberResponse {
    pub member: Member,
}

/// POST /api/v1/members
pub async fn register_member_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterMemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let Json(request) = payload?;

    let registration = register_member(
        RegisterMember {
            name: request.name,
            email: request.email,
            password: secret(request.password),
        },
        &state.deps,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(registration)))
}

/// PUT /api/v1/members/activated
pub async fn activate_member_handler(
    State(state): State<AppState>,
    payload: Result<Json<ActivateMemberRequest>, JsonRejection>,
) -> Result<Json<MemberResponse>, ApiError> {
    let Json(request) = payload?;
    let member = activate_member(&request.token, &state.deps).await?;
    Ok(Json(MemberResponse { member }))
}

/// GET /api/v1/members/me
pub async fn current_member_handler(Authenticated(member): Authenticated) -> Json<MemberResponse> {
    Json(MemberResponse { member })
}

/// PATCH /api/v1/members/me
pub async fn update_member_handler(
    State(state): State<AppState>,
    Activated(member): Activated,
    payload: Result<Json<UpdateMemberRequest>, JsonRejection>,
) -> Result<Json<MemberResponse>, ApiError> {
    let Json(request) = payload?;
    let member = update_profile(
        member,
        UpdateProfile {
            name: request.name,
            email: request.email,
        },
        &state.deps,
    )
    .await?;
    Ok(Json(MemberResponse { member }))
}

/// PUT /api/v1/members/password
pub async fn change_password_handler(
    State(state): State<AppState>,
    Activated(member): Activated,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<MemberResponse>, ApiError> {
    let Json(request) = payload?;
    let member = change_password(
        member,
        ChangePassword {
            current_password: secret(request.current_password),
            new_password: secret(request.new_password),
        },
        &state.deps,
    )
    .await?;
    Ok(Json(MemberResponse { member }))
}
