//! HTTP control surface using Axum

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::core::engine::{BotEngine, EngineStatus};
use crate::error::ConfigError;
use crate::metrics::Metrics;
use crate::models::settings::{Settings, SettingsPatch};
use crate::models::signal::Signal;

pub const SERVICE_NAME: &str = "pocket-signals";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BotEngine>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
}

/// Error body returned by the API.
pub struct ApiError(ConfigError);

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let body = Json(json!({
            "error": self.0.to_string(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": SERVICE_NAME,
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Increment in-flight requests
    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    // Record metrics
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    // Log server errors
    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "HTTP request error"
        );
    }

    response
}

/// Running flag, latest signal, windowed signal count and win rate.
async fn get_status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.engine.status().await)
}

/// Last 50 signals, oldest first.
async fn get_signals(State(state): State<AppState>) -> Json<Vec<Signal>> {
    Json(state.engine.signals().await)
}

async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.engine.settings().await)
}

async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Settings>, ApiError> {
    let patch = SettingsPatch::from_json(body)?;
    let settings = state.engine.update_settings(&patch).await?;
    Ok(Json(settings))
}

/// Form-encoded variant of the settings update for plain HTML forms.
async fn update_settings_form(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Json<Settings>, ApiError> {
    let patch = SettingsPatch::from_pairs(fields)?;
    let settings = state.engine.update_settings(&patch).await?;
    Ok(Json(settings))
}

async fn start_bot(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.engine.start().await?;
    info!("Trading bot started");
    Ok(Json(json!({ "running": state.engine.is_running().await })))
}

async fn stop_bot(State(state): State<AppState>) -> Json<Value> {
    state.engine.stop().await;
    info!("Trading bot stopped");
    Json(json!({ "running": state.engine.is_running().await }))
}

async fn toggle_bot(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let running = state.engine.toggle().await?;
    Ok(Json(json!({ "running": running })))
}

async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.engine.clear_history().await;
    StatusCode::NO_CONTENT
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/status", get(get_status))
        .route("/api/signals", get(get_signals))
        .route(
            "/api/settings",
            get(get_settings)
                .put(update_settings)
                .post(update_settings_form),
        )
        .route("/api/bot/start", post(start_bot))
        .route("/api/bot/stop", post(stop_bot))
        .route("/api/bot/toggle", post(toggle_bot))
        .route("/api/history/clear", post(clear_history))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
