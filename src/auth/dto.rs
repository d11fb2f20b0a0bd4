use serde::{Deserialize, Serialize};

/// Request body for user registration. Absent fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub result: bool,
}

/// `token` is empty on failure.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub result: bool,
    pub token: String,
}
