//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::middleware::{authenticate, vary_authorization};
use crate::server::routes::{
    activate_member_handler, change_password_handler, create_authentication_token_handler,
    create_category_handler, create_dish_handler, current_member_handler, delete_category_handler,
    delete_dish_handler, get_category_handler, get_dish_handler, healthcheck_handler,
    list_categories_handler, list_dishes_handler, register_member_handler,
    update_category_handler, update_dish_handler, update_member_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub env: String,
}

/// HTTP-level settings for [`build_app`].
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub env: String,
    pub allowed_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            env: "development".to_string(),
            allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Requests running past `limit` are answered with 408.
fn timeout_layer(limit: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, limit)
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, options: AppOptions) -> Router {
    let state = AppState {
        deps: Arc::new(deps),
        env: options.env,
    };

    let api = Router::new()
        .route("/healthcheck", get(healthcheck_handler))
        .route("/members", post(register_member_handler))
        .route("/members/activated", put(activate_member_handler))
        .route("/members/password", put(change_password_handler))
        .route(
            "/members/me",
            get(current_member_handler).patch(update_member_handler),
        )
        .route(
            "/tokens/authentication",
            post(create_authentication_token_handler),
        )
        .route(
            "/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        .route(
            "/categories/:id",
            get(get_category_handler)
                .put(update_category_handler)
                .patch(update_category_handler)
                .delete(delete_category_handler),
        )
        .route("/dishes", get(list_dishes_handler).post(create_dish_handler))
        .route(
            "/dishes/:id",
            get(get_dish_handler)
                .put(update_dish_handler)
                .patch(update_dish_handler)
                .delete(delete_dish_handler),
        );

    Router::new()
        .nest("/api/v1", api)
        .fallback(not_found_handler)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn(vary_authorization))
        .layer(timeout_layer(options.request_timeout))
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
