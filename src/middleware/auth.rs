use crate::models::response::ErrorResponse;
use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Static API-key check for every endpoint. The expected key comes from
/// `HEADER_API_KEY`.
pub async fn api_key_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let expected = std::env::var("HEADER_API_KEY").unwrap_or_else(|_| "changeme".to_string());

    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if key == expected => Ok(next.run(request).await),
        _ => {
            tracing::warn!("Rejected request with missing or invalid API key");
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    success: false,
                    message: "Unauthorized".to_string(),
                }),
            ))
        }
    }
}
