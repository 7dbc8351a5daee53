use std::sync::Arc;
use std::time::Duration;

use askama_axum::Template;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::aggregator::aggregate;
use crate::fetcher::Fetcher;
use crate::registry::{RegistryError, SourceRegistry};

pub struct AppState {
    pub registry: Arc<SourceRegistry>,
    pub fetcher: Arc<Fetcher>,
    /// How often the page reloads the merged feed
    pub poll_interval: Duration,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub poll_interval_ms: u128,
}

#[derive(Debug)]
pub enum AppError {
    InvalidPayload,
    Registry(RegistryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidPayload | AppError::Registry(RegistryError::Empty) => {
                (StatusCode::BAD_REQUEST, "invalid JSON payload")
            }
            AppError::Registry(RegistryError::InvalidUrl(_)) => {
                (StatusCode::BAD_REQUEST, "invalid URL")
            }
            AppError::Registry(RegistryError::Duplicate(_)) => {
                (StatusCode::CONFLICT, "source already exists")
            }
            AppError::Registry(RegistryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "source not found")
            }
        };
        (status, message).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        AppError::Registry(err)
    }
}

/// Body of the add/remove endpoints: `{"url": "..."}`.
#[derive(Debug, Deserialize)]
pub struct SourcePayload {
    #[serde(default)]
    pub url: String,
}

impl SourcePayload {
    /// Decoded by hand so every malformed body is a plain 400. Only a JSON
    /// object is accepted.
    fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|_| AppError::InvalidPayload)?;
        if !value.is_object() {
            return Err(AppError::InvalidPayload);
        }
        serde_json::from_value(value).map_err(|_| AppError::InvalidPayload)
    }
}

/// Builds the application router. `extra` carries any additional routes to
/// serve next to the built-in ones.
pub fn build_router(state: Arc<AppState>, extra: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/feeds", get(feeds))
        .route("/api/sources", get(sources))
        .route("/api/sources/add", post(add_source))
        .route("/api/sources/remove", post(remove_source))
        .merge(extra)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Route handlers
pub async fn index(State(state): State<Arc<AppState>>) -> IndexTemplate {
    IndexTemplate {
        poll_interval_ms: state.poll_interval.as_millis(),
    }
}

pub async fn feeds(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(aggregate(&state.fetcher, &state.registry).await)
}

pub async fn sources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.registry.list().await)
}

pub async fn add_source(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let payload = SourcePayload::from_body(&body)?;
    let url = state.registry.add(&payload.url).await?;
    info!("Added source {}", url);
    Ok(StatusCode::CREATED)
}

pub async fn remove_source(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let payload = SourcePayload::from_body(&body)?;
    state.registry.remove(&payload.url).await?;
    info!("Removed source {}", payload.url.trim());
    Ok(StatusCode::OK)
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
