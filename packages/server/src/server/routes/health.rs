use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    system_info: SystemInfo,
}

#[derive(Serialize)]
pub struct SystemInfo {
    environment: String,
    version: &'static str,
}

/// Health check endpoint
///
/// Returns 200 when the store answers a ping within its timeout,
/// 503 Service Unavailable otherwise.
pub async fn healthcheck_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, status) = match state.deps.members.ping().await {
        Ok(()) => (StatusCode::OK, "available"),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            system_info: SystemInfo {
                environment: state.env.clone(),
                version: env!("CARGO_PKG_VERSION"),
            },
        }),
    )
}
