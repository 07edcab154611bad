//! Local HTTP API for the recorder UI and automation harnesses.
//!
//! Carries the inbound UI messages (save requests), the attach hook and the
//! settings surface. UI messages are handled fire-and-forget: failures are
//! caught and discarded with no response sent back.

use crate::config::{Settings, SettingsPatch};
use crate::engine::Mode;
use crate::host::TabId;
use crate::state::Background;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub type ApiState = Arc<Background>;

/// Inbound messages from the recorder UI.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "params", rename_all = "camelCase")]
enum UiMessage {
    #[serde(rename_all = "camelCase")]
    SaveRequested {
        code: String,
        suggested_name: String,
    },
    SaveStorageStateRequested,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachRequest {
    tab_id: TabId,
    #[serde(default)]
    mode: Option<Mode>,
}

async fn health() -> &'static str {
    "ok"
}

/// UI message intake. Always answers 204: a malformed message, an unknown
/// event or a failed flow is discarded, never reported back to the UI.
async fn post_message(
    State(state): State<ApiState>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let message: UiMessage = match serde_json::from_value(body) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!("Discarding malformed UI message: {}", e);
            return StatusCode::NO_CONTENT;
        }
    };

    match message {
        UiMessage::SaveRequested {
            code,
            suggested_name,
        } => {
            let background = Arc::clone(&state);
            tokio::spawn(async move {
                if let Err(e) = background.save_script(code, suggested_name).await {
                    tracing::warn!("Script save failed: {}", e);
                }
            });
        }
        UiMessage::SaveStorageStateRequested => {
            let background = Arc::clone(&state);
            tokio::spawn(async move {
                if let Err(e) = background.save_storage_state().await {
                    tracing::warn!("Storage state save failed: {}", e);
                }
            });
        }
    }

    StatusCode::NO_CONTENT
}

async fn post_attach(
    State(state): State<ApiState>,
    Json(request): Json<AttachRequest>,
) -> StatusCode {
    match state.attach(request.tab_id, request.mode).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            tracing::warn!("Attach via API failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn get_settings(State(state): State<ApiState>) -> Json<Settings> {
    Json(state.settings.current())
}

async fn put_settings(
    State(state): State<ApiState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, StatusCode> {
    match state.settings.update(patch) {
        Ok(settings) => Ok(Json(settings)),
        Err(e) => {
            tracing::error!("Settings update failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/message", post(post_message))
        .route("/api/attach", post(post_attach))
        .route("/api/settings", get(get_settings).put(put_settings))
        .with_state(state)
}

/// Build the API service with CORS and a concurrency cap.
/// Used by `run_server` and by integration tests.
pub fn app(state: ApiState) -> Router {
    use tower::limit::ConcurrencyLimitLayer;
    router(state)
        .layer(ConcurrencyLimitLayer::new(32))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
}

pub async fn run_server(state: ApiState, port: u16) -> crate::error::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    let app = app(state);
    tracing::info!("Recorder API listening on http://127.0.0.1:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
