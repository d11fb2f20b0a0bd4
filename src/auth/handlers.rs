use axum::{
    extract::{rejection::BytesRejection, FromRef, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginResponse, RegisterRequest, RegisterResponse},
        jwt::JwtKeys,
        services,
    },
    response::json,
    routes::not_found,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).fallback(not_found))
        .route("/login", get(login).fallback(not_found))
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "could not read register body");
            return json(
                StatusCode::BAD_REQUEST,
                &RegisterResponse {
                    message: "Could not read request body.".into(),
                    result: false,
                },
            );
        }
    };

    let payload = match serde_json::from_slice::<RegisterRequest>(&body) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "could not parse register body");
            return json(
                StatusCode::BAD_REQUEST,
                &RegisterResponse {
                    message: "Could not parse request body.".into(),
                    result: false,
                },
            );
        }
    };

    match services::register(state.users.as_ref(), payload).await {
        Ok(_) => json(
            StatusCode::OK,
            &RegisterResponse {
                message: "User registered successfully.".into(),
                result: true,
            },
        ),
        Err(e) => json(
            e.status(),
            &RegisterResponse {
                message: e.to_string(),
                result: false,
            },
        ),
    }
}

#[instrument(skip(state, headers))]
pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let keys = JwtKeys::from_ref(&state);
    match services::login(state.users.as_ref(), &keys, headers.get(AUTHORIZATION)).await {
        Ok(token) => json(
            StatusCode::OK,
            &LoginResponse {
                message: "Success.".into(),
                result: true,
                token,
            },
        ),
        Err(e) => json(
            e.status(),
            &LoginResponse {
                message: e.to_string(),
                result: false,
                token: String::new(),
            },
        ),
    }
}
