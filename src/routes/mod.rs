use axum::{http::StatusCode, response::Response, routing::get, Router};

use crate::{
    response::{json, MessageResponse},
    state::AppState,
};

pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home).fallback(not_found))
        .route("/health", get(health).fallback(not_found))
}

pub async fn home() -> Response {
    json(StatusCode::OK, &MessageResponse { message: "Welcome!" })
}

pub async fn health() -> Response {
    json(StatusCode::OK, &MessageResponse { message: "OK" })
}

/// Unknown paths, and known paths hit with the wrong method.
pub async fn not_found() -> Response {
    json(
        StatusCode::NOT_FOUND,
        &MessageResponse {
            message: "Unsupported URL provided.",
        },
    )
}
