use axum::http::HeaderValue;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::{
    auth::{
        basic::Credentials,
        dto::RegisterRequest,
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking},
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::ApiError,
};

/// Creates a user unless the email is already taken.
///
/// Uniqueness is a lookup followed by an insert; two concurrent calls with
/// the same email can both succeed.
pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> Result<User, ApiError> {
    if req.email.is_empty() || req.username.is_empty() || req.password.is_empty() {
        warn!("register with empty field");
        return Err(ApiError::Validation("Malformed request body."));
    }

    match store.find_by_email(&req.email).await {
        Ok(None) => {}
        Ok(Some(existing)) => {
            warn!(email = %req.email, user_id = %existing.id, "email already registered");
            return Err(ApiError::Conflict("Email already registered."));
        }
        Err(e) => {
            error!(error = ?e, "find_by_email failed");
            return Err(ApiError::internal("Could not lookup provided email.", e));
        }
    }

    let password_hash = hash_password_blocking(req.password).await.map_err(|e| {
        error!(error = ?e, "hash_password failed");
        ApiError::internal("Could not generate password hash.", e)
    })?;

    let user = store
        .insert(NewUser {
            email: req.email,
            username: req.username,
            password_hash,
            creation_timestamp: OffsetDateTime::now_utc().unix_timestamp(),
        })
        .await
        .map_err(|e| {
            error!(error = ?e, "insert user failed");
            ApiError::internal("Could not insert user.", e)
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Resolves a `Basic` credential header to a signed token.
///
/// An unknown email and a wrong password fail identically.
pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    header: Option<&HeaderValue>,
) -> Result<String, ApiError> {
    let creds = Credentials::from_header(header)?;

    let user = match store.find_by_email(&creds.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %creds.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = ?e, "find_by_email failed");
            return Err(ApiError::internal("Failed to validate credentials.", e));
        }
    };

    if !verify_password_blocking(creds.password, user.password_hash.clone()).await {
        warn!(email = %creds.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = keys.sign(&user).map_err(|e| {
        error!(error = ?e, "jwt sign failed");
        ApiError::internal("Unable to generate token.", e)
    })?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(token)
}
