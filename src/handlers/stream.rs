// src/handlers/stream.rs
//! SSE endpoint streaming generation progress as it happens

use crate::handlers::generate::parse_script_form;
use crate::middleware::auth::api_key_middleware;
use crate::models::response::ErrorResponse;
use crate::services::script_generation::stream_generation;
use crate::AppState;
use axum::{
    extract::{multipart::Multipart, DefaultBodyLimit, Extension},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
    routing::post,
    Router,
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;

pub fn stream_routes() -> Router {
    Router::new()
        .route("/generate-script/stream", post(stream_script))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
        .layer(axum::middleware::from_fn(api_key_middleware))
}

/// POST /generate-script/stream - run the workflow and stream
/// started/research_completed/completed/failed frames
pub async fn stream_script(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, Json<ErrorResponse>)> {
    let request = parse_script_form(multipart).await?;
    tracing::info!("📡 Streaming script generation for '{}'", request.topic);

    let stream = stream_generation(state, request).map(|event| {
        let frame = Event::default().json_data(&event).unwrap_or_else(|e| {
            tracing::error!("Failed to encode SSE frame: {}", e);
            Event::default().data("{\"status\":\"failed\",\"error\":\"event encoding error\"}")
        });
        Ok::<Event, Infallible>(frame)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
