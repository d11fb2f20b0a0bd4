use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

const FALLBACK_BODY: &str = "{\n\t\"error\": \"Could not process response body.\"\n}";

/// Serializes `body` as the JSON payload of a response with `status`.
///
/// A body that cannot be serialized turns into a fixed 500 payload.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => {
            error!(error = %e, %status, "could not serialize response body");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                FALLBACK_BODY,
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
