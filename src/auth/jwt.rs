use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::{claims::Claims, repo_types::User},
    config::JwtConfig,
    state::AppState,
};

/// HS256 signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_minutes: Option<i64>,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl_minutes: cfg.ttl_minutes,
        }
    }

    /// Signs the login claims for `user`.
    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = match self.ttl_minutes {
            Some(minutes) => Some(expires_at(now, minutes)?),
            None => None,
        };
        let claims = Claims {
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            iat: now.unix_timestamp() as usize,
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    /// Checks the signature and, when present, the expiry.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        if self.ttl_minutes.is_some() {
            validation.set_required_spec_claims(&["exp"]);
        }
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(email = %data.claims.email, "jwt verified");
        Ok(data.claims)
    }
}

/// Unix timestamp `minutes` after `now`; errors instead of overflowing.
fn expires_at(now: OffsetDateTime, minutes: i64) -> anyhow::Result<usize> {
    let ttl = minutes
        .checked_mul(60)
        .map(TimeDuration::seconds)
        .context("token ttl out of range")?;
    let at = now.checked_add(ttl).context("token expiry out of range")?;
    usize::try_from(at.unix_timestamp()).context("token expiry before epoch")
}
