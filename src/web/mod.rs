// Web server — Axum-based JSON API around the URL scorer.
//
// POST /analyze is the only route and is rate-limited per client.
// CORS is wide open so a browser front end on any origin can call the API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::rate_limit::{spawn_eviction_task, ClientRateLimiter};
use crate::scoring::RuleSet;

pub mod client;
pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rules: Arc<RuleSet>,
    pub limiter: Arc<ClientRateLimiter>,
}

impl AppState {
    /// Build state with the canonical rule table and a limiter sized from `config`.
    pub fn new(config: Config) -> Self {
        let limiter = ClientRateLimiter::new(config.rate_limit, config.rate_window);
        Self {
            config: Arc::new(config),
            rules: Arc::new(RuleSet::default()),
            limiter: Arc::new(limiter),
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.bind, config.port);
    let state = AppState::new(config);

    // Without this the limiter keeps one entry per client ever seen
    spawn_eviction_task(state.limiter.clone());

    info!(
        limit = state.limiter.max_requests(),
        window_secs = state.limiter.window().as_secs(),
        trust_forwarded_for = state.config.trust_forwarded_for,
        "scamcheck listening on http://{addr}"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze::analyze))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// JSON error response helper: `{ "detail": message }`.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "detail": message }))).into_response()
}
