//! HTTP server.
//!
//! Wires the handlers into an axum router under the configured prefix and
//! serves it until Ctrl-C.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::handlers::{self, HandlerContext};
use crate::models::ApiResponse;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Builds the router for all endpoints.
pub fn build_router(ctx: Arc<HandlerContext>, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/createasset", post(create_asset_route))
        .route("/registerplayer", post(register_player_route))
        .route(
            "/getassetsbyplayer",
            get(get_assets_by_player_route).options(report_preflight_route),
        )
        .with_state(ctx);

    let api = match config.normalized_prefix() {
        Some(prefix) => Router::new().nest(&prefix, api),
        None => api,
    };

    api.route("/health", get(health_route))
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: &ServerConfig, router: Router) -> Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind {addr}: {e}")))?;

    let prefix = config.normalized_prefix().unwrap_or_default();
    info!("Listening on http://{}", addr);
    info!("Endpoints:");
    info!("  POST {}/createasset", prefix);
    info!("  POST {}/registerplayer", prefix);
    info!("  GET  {}/getassetsbyplayer", prefix);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

async fn create_asset_route(
    State(ctx): State<Arc<HandlerContext>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => handlers::create_asset(&ctx, &body).await.into_response(),
        Err(rejection) => rejected_body(rejection),
    }
}

async fn register_player_route(
    State(ctx): State<Arc<HandlerContext>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => handlers::register_player(&ctx, &body).await.into_response(),
        Err(rejection) => rejected_body(rejection),
    }
}

/// Wraps a body that could not be read (e.g. over the size limit) in the
/// error envelope, keeping axum's status code.
fn rejected_body(rejection: BytesRejection) -> Response {
    let message = rejection.body_text();
    warn!("Request body rejected: {}", message);
    (
        rejection.status(),
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}

async fn get_assets_by_player_route(State(ctx): State<Arc<HandlerContext>>) -> Response {
    let reply = handlers::get_assets_by_player(&ctx).await;
    let success = reply.is_success();
    with_report_cors(reply.into_response(), success)
}

async fn report_preflight_route() -> Response {
    with_report_cors(StatusCode::NO_CONTENT.into_response(), true)
}

/// The report is fetched directly by the browser frontend.
///
/// Set by hand rather than with `CorsLayer`, which only sends
/// `Access-Control-Allow-Methods` on preflight; the frontend expects it on
/// successful GETs too.
fn with_report_cors(mut response: Response, full: bool) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    if full {
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
    }
    response
}

async fn health_route() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
