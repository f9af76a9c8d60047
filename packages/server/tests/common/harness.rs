//! Test harnesses for integration testing.
//!
//! `TestApp` drives the real router against the in-memory store.
//! `PostgresHarness` starts one shared Postgres container (testcontainers),
//! runs migrations once, and hands each test a fresh pool.

#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use tower::ServiceExt;

use server_core::kernel::{BasePermissionStore, InMemoryStore, TestDependencies, TokenTtls};
use server_core::server::{build_app, AppOptions};

// =============================================================================
// In-memory application
// =============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }

    pub fn field_error(&self, field: &str) -> &str {
        self.body["error"]["fields"][field]
            .as_str()
            .unwrap_or_default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_token_ttls(TokenTtls::default())
    }

    pub fn with_token_ttls(token_ttls: TokenTtls) -> Self {
        let test = TestDependencies::with_token_ttls(token_ttls);
        let router = build_app(
            test.deps,
            AppOptions {
                env: "test".to_string(),
                ..AppOptions::default()
            },
        );
        Self {
            router,
            store: test.store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        self.request(Method::GET, uri, auth.as_deref(), None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        self.request(method, uri, auth.as_deref(), Some(body)).await
    }

    /// Register a member; returns the activation token.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/v1/members",
                None,
                json!({ "name": name, "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["activation_token"]["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn activate(&self, activation_token: &str) -> TestResponse {
        self.send(
            Method::PUT,
            "/api/v1/members/activated",
            None,
            json!({ "token": activation_token }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/v1/tokens/authentication",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn login_token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["authentication_token"]["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Register, activate and log in; returns the authentication token.
    pub async fn activated_member(&self, email: &str, password: &str) -> String {
        let activation = self.register("Test Member", email, password).await;
        let activated = self.activate(&activation).await;
        assert_eq!(activated.status, StatusCode::OK, "{}", activated.body);
        self.login_token(email, password).await
    }

    /// Activated member holding `dishes:write`; returns the authentication token.
    pub async fn writer(&self, email: &str, password: &str) -> String {
        let token = self.activated_member(email, password).await;
        let member = self.get("/api/v1/members/me", Some(&token)).await.body["member"]["id"]
            .as_i64()
            .unwrap();
        self.store
            .add_for_member(member.into(), &["dishes:write"])
            .await
            .unwrap();
        token
    }
}

// =============================================================================
// Postgres (testcontainers)
// =============================================================================

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Fresh pool on the shared, migrated database.
///
/// ```ignore
/// #[test_context(PostgresHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &PostgresHarness) { ... }
/// ```
pub struct PostgresHarness {
    pub db_pool: PgPool,
}

impl AsyncTestContext for PostgresHarness {
    async fn setup() -> Self {
        let infra = SharedTestInfra::get().await;
        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .expect("Failed to connect to test database");
        Self { db_pool }
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}
