//! HTTP surface: axum router, shared state and the owner extractor.
//!
//! Every `/api` route is scoped to the caller named by the `X-User-Id` header.
//! Authentication happens upstream; this service trusts the header.

/// Budget routes and alerts
pub mod budgets;
/// Error-to-response mapping
pub mod error;
/// Transaction routes and statistics
pub mod transactions;

use crate::{
    config::Settings,
    errors::{Error, Result},
};
use axum::{Json, Router, extract::FromRequestParts, http::request::Parts, routing::get};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub use error::{ApiError, ApiResult};

/// Header carrying the authenticated owner id
pub const USER_ID_HEADER: &str = "x-user-id";

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
    /// Loaded application settings
    pub settings: Settings,
}

/// The caller's owner id, taken from the `X-User-Id` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> ApiResult<Self> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(value.to_string()))
            .ok_or(ApiError::MissingOwner)
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "timestamp": chrono::Utc::now() }))
}

/// Builds the full application router.
pub fn app_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .merge(budgets::router())
                .merge(transactions::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves the router on `listen_addr` until Ctrl+C.
pub async fn serve(state: Arc<AppState>, listen_addr: &str) -> Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::from)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    pub async fn test_app() -> Router {
        let db = setup_test_db().await.unwrap();
        app_router(Arc::new(AppState {
            db,
            settings: Settings::default(),
        }))
    }

    /// Sends one request and returns the status with the decoded JSON body.
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(app: &Router, uri: &str, user: &str) -> (StatusCode, Value) {
        send(app, "GET", uri, Some(user), None).await
    }

    pub async fn post(app: &Router, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
        send(app, "POST", uri, Some(user), Some(body)).await
    }

    pub async fn put(app: &Router, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
        send(app, "PUT", uri, Some(user), Some(body)).await
    }

    pub async fn delete(app: &Router, uri: &str, user: &str) -> (StatusCode, Value) {
        send(app, "DELETE", uri, Some(user), None).await
    }
}
