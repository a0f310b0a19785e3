// src/handlers/generate.rs
//! Script generation endpoints - submit, poll, download, health

use crate::files;
use crate::middleware::auth::api_key_middleware;
use crate::models::response::{ErrorResponse, ScriptResponse};
use crate::services::script_generation::run_generation_task;
use crate::tasks::TaskStatus;
use crate::workflow::{Platform, ScriptRequest};
use crate::AppState;
use axum::{
    body::Body,
    extract::{multipart::Multipart, DefaultBodyLimit, Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

pub fn script_routes() -> Router {
    Router::new()
        .route("/generate-script", post(generate_script))
        .route("/task/:task_id", get(get_task_status))
        .route("/download-script/:task_id", get(download_script))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
        .layer(axum::middleware::from_fn(api_key_middleware))
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            success: false,
            message: message.to_string(),
        }),
    )
}

/// Parse the multipart generation form shared by the polling and streaming
/// endpoints: topic (required), tones (repeatable), platform, and an optional
/// reference document upload.
pub async fn parse_script_form(
    mut multipart: Multipart,
) -> Result<ScriptRequest, (StatusCode, Json<ErrorResponse>)> {
    let mut topic = String::new();
    let mut tones: Vec<String> = Vec::new();
    let mut platform_raw = String::new();
    let mut uploaded_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Malformed multipart form: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "topic" => {
                topic = field
                    .text()
                    .await
                    .map_err(|e| bad_request(&format!("Invalid topic field: {}", e)))?;
            }
            "tones" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| bad_request(&format!("Invalid tones field: {}", e)))?;
                tones.extend(
                    value
                        .split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty()),
                );
            }
            "platform" => {
                platform_raw = field
                    .text()
                    .await
                    .map_err(|e| bad_request(&format!("Invalid platform field: {}", e)))?;
            }
            "file_name" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("reference.md")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("Invalid file upload: {}", e)))?;
                if !data.is_empty() {
                    let path = files::save_upload_file(&file_name, &data)
                        .await
                        .map_err(|e| bad_request(&e))?;
                    uploaded_path = Some(path);
                }
            }
            _ => {}
        }
    }

    if topic.trim().is_empty() {
        return Err(bad_request("Field 'topic' is required and must be non-empty"));
    }

    let platform = Platform::parse(&platform_raw);
    let file_path = uploaded_path.unwrap_or_else(|| default_template_path(platform).to_string());

    Ok(ScriptRequest {
        topic,
        tones: tones.join(", "),
        file_path,
        current_year: None,
        platform,
    })
}

/// Default reference template used when the caller uploads nothing.
fn default_template_path(platform: Platform) -> &'static str {
    match platform {
        Platform::Youtube => "template_scripts/script-template-en.md",
        Platform::Short => "template_scripts/short-script-en.md",
    }
}

/// POST /generate-script - start a generation task and return its id
pub async fn generate_script(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ScriptResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = parse_script_form(multipart).await?;

    let task_id = state.task_manager.create_task().await;
    tokio::spawn(run_generation_task(state.clone(), task_id.clone(), request));

    Ok(Json(ScriptResponse::accepted(task_id)))
}

/// GET /task/:task_id - poll a generation task
pub async fn get_task_status(
    Path(task_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    match state.task_manager.get_task(&task_id).await {
        Some(task) => (
            StatusCode::OK,
            Json(ScriptResponse {
                task_id: task.id,
                status: task.status,
                result: task.result,
                error: task.error,
                file_path: task.file_path,
            }),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Task not found").into_response(),
    }
}

/// GET /download-script/:task_id - download the finished script file
pub async fn download_script(
    Path(task_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    let task = match state.task_manager.get_task(&task_id).await {
        Some(task) => task,
        None => return (StatusCode::NOT_FOUND, "Task not found").into_response(),
    };

    if task.status != TaskStatus::Completed {
        return (StatusCode::BAD_REQUEST, "Script not ready for download").into_response();
    }
    let file_path = match task.file_path {
        Some(path) => path,
        None => return (StatusCode::BAD_REQUEST, "Script not ready for download").into_response(),
    };

    let file = match tokio::fs::File::open(&file_path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!("Script file missing for task {}: {}", task_id, e);
            return (StatusCode::NOT_FOUND, "Script file not found").into_response();
        }
    };

    let stream = ReaderStream::new(file);
    let headers = [
        (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"script_{}.md\"", task_id),
        ),
    ];
    (headers, Body::from_stream(stream)).into_response()
}

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
