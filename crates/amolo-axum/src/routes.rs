//! Route definitions and router construction.
//!
//! | Route                   | Gate      | Handler                   |
//! |-------------------------|-----------|---------------------------|
//! | `GET /health`           | none      | [`health_check`]          |
//! | `POST /api/chat`        | admission | buffered chat             |
//! | `POST /api/chat/stream` | admission | streamed chat             |
//! | `POST /chat`            | admission | legacy single message     |
//!
//! Anything else, including a known path with the wrong method, is an
//! ungated 404.

use std::any::Any;
use std::sync::Arc;

use axum::http::{HeaderValue, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::Serialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use amolo_core::ServiceError;

use crate::bootstrap::{AxumContext, CorsConfig, Environment};
use crate::error::HttpError;
use crate::handlers;
use crate::middleware::admission_gate;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any)
        }
    }
}

/// Chat routes, all behind the admission gate.
///
/// The gate wraps only the POST endpoints, so a wrong-method 404 is not
/// counted against the client's quota.
fn chat_routes(state: &AppState) -> Router<AppState> {
    let gate = middleware::from_fn_with_state(Arc::clone(state), admission_gate);

    Router::new()
        .route(
            "/api/chat",
            post(handlers::chat::chat)
                .route_layer(gate.clone())
                .fallback(not_found),
        )
        .route(
            "/api/chat/stream",
            post(handlers::chat::chat_stream)
                .route_layer(gate.clone())
                .fallback(not_found),
        )
        .route(
            "/chat",
            post(handlers::chat::legacy_chat)
                .route_layer(gate)
                .fallback(not_found),
        )
}

/// Create the main Axum router.
///
/// Client addresses for admission control come from `ConnectInfo`; serve the
/// router with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let environment = ctx.environment;
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/health", get(health_check).fallback(not_found))
        .merge(chat_routes(&state))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| panic_response(panic, environment),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_config))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

/// Health check endpoint.
pub(crate) async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: "AMOLO AI Backend",
    })
}

async fn not_found(uri: Uri) -> HttpError {
    HttpError::not_found(uri.path())
}

/// Last-resort boundary: a panicking handler becomes a generic 500.
fn panic_response(panic: Box<dyn Any + Send + 'static>, environment: Environment) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());
    error!("Request handler panicked: {detail}");

    HttpError::from(ServiceError::Internal(detail))
        .redacted(environment)
        .into_response()
}
