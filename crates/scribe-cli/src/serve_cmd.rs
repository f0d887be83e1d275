use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use scribe_core::generator::Generator;
use scribe_core::wbs;
use scribe_db::models::{Meeting, Task, Work};
use scribe_db::queries::{meetings as meeting_db, tasks as task_db, works as work_db};

/// Success message returned to the caller after a stored run.
const EXPORT_SUCCESS_MESSAGE: &str = "meeting script successfully exported to notion";

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub generator: Arc<dyn Generator>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Client-side label for the submission; the pipeline derives its own
    /// title from the transcript.
    #[serde(default)]
    pub title: String,
    /// The raw meeting transcript.
    pub record: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub data: GenerateData,
}

#[derive(Debug, Serialize)]
pub struct GenerateData {
    pub meetingid: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MeetingDetailResponse {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub works: Vec<Work>,
    pub tasks: Vec<Task>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/api/meetings", get(list_meetings))
        .route("/api/meetings/{id}", get(get_meeting_detail))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("scribe serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("scribe serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let meetings = meeting_db::list_meetings(&state.pool)
        .await
        .map_err(AppError::internal)?;

    let rows = if meetings.is_empty() {
        "<tr><td colspan=\"3\">No meetings yet.</td></tr>".to_string()
    } else {
        meetings
            .iter()
            .map(|m| {
                format!(
                    "<tr><td><a href=\"/api/meetings/{id}\">{title}</a></td><td>{created}</td><td>{id}</td></tr>",
                    id = m.id,
                    title = if m.title.is_empty() { "(untitled)" } else { &m.title },
                    created = m.created_at.format("%Y-%m-%d %H:%M"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>scribe</title></head><body>\
<h1>scribe</h1>\
<p><a href=\"/api/meetings\">/api/meetings</a></p>\
<table><tr><th>Meeting</th><th>Created</th><th>ID</th></tr>{rows}</table>\
</body></html>"
    );

    Ok(Html(html).into_response())
}

async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<axum::response::Response, AppError> {
    tracing::debug!(title = %req.title, "generate request received");

    let meeting_id = wbs::run_pipeline(&state.pool, state.generator.as_ref(), &req.record)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(GenerateResponse {
        message: EXPORT_SUCCESS_MESSAGE.to_string(),
        data: GenerateData {
            meetingid: meeting_id,
        },
    })
    .into_response())
}

async fn list_meetings(
    State(state): State<AppState>,
) -> Result<axum::response::Response, AppError> {
    let meetings = meeting_db::list_meetings(&state.pool)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(meetings).into_response())
}

async fn get_meeting_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let meeting = meeting_db::get_meeting(&state.pool, id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(format!("meeting {id} not found")))?;

    let works = work_db::list_works_for_meeting(&state.pool, id)
        .await
        .map_err(AppError::internal)?;

    let tasks = task_db::list_tasks_for_meeting(&state.pool, id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(MeetingDetailResponse {
        meeting,
        works,
        tasks,
    })
    .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
