use axum::http::HeaderValue;
use base64ct::{Base64, Encoding};
use tracing::warn;

use crate::error::ApiError;

const SCHEME: &str = "Basic ";

pub const EMPTY_HEADER: &str = "Empty/absent \"Authorization\" header value.";
pub const MALFORMED_HEADER: &str = "Malformed Authorization header.";

/// Email and password carried by a `Basic` credential header.
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Decodes `Basic base64(email:password)`.
    ///
    /// The payload is split on its first colon, so the password may itself
    /// contain colons. Both halves must be non-empty.
    pub fn from_header(header: Option<&HeaderValue>) -> Result<Self, ApiError> {
        let raw = match header {
            Some(v) if !v.is_empty() => v,
            _ => {
                warn!("empty or absent authorization header");
                return Err(ApiError::Validation(EMPTY_HEADER));
            }
        };

        let encoded = raw
            .to_str()
            .ok()
            .and_then(|s| s.strip_prefix(SCHEME))
            .ok_or_else(|| {
                warn!("authorization header without basic scheme");
                ApiError::Validation(MALFORMED_HEADER)
            })?;

        let decoded = Base64::decode_vec(encoded)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| {
                warn!("authorization payload is not valid base64 text");
                ApiError::Validation(MALFORMED_HEADER)
            })?;

        match decoded.split_once(':') {
            Some((email, password)) if !email.is_empty() && !password.is_empty() => Ok(Self {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => {
                warn!("authorization payload is not email:password");
                Err(ApiError::Validation(MALFORMED_HEADER))
            }
        }
    }
}
