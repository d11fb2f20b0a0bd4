use std::net::IpAddr;

use axum::http::{HeaderName, HeaderValue, Method};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable \"{0}\" not provided")]
    Missing(&'static str),
    #[error("environment variable \"{name}\" is invalid: {reason}, got \"{value}\"")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Upper bound for `JWT_TTL_MINUTES`: 100 years.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 100;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Tokens carry no `exp` claim unless this is set.
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: Option<String>,
    pub max_connections: u32,
}

/// Either every value is allowed (`*`) or only the listed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList<T> {
    Any,
    Only(Vec<T>),
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: AllowList<HeaderValue>,
    pub allowed_methods: AllowList<Method>,
    pub allowed_headers: AllowList<HeaderName>,
    pub allow_credentials: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let host = match lookup("APP_HOST") {
            Some(v) => v.parse::<IpAddr>().map_err(|_| ConfigError::Invalid {
                name: "APP_HOST",
                value: v.clone(),
                reason: "must be an IP address",
            })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port_raw = required("PORT")?;
        let port = port_raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
            name: "PORT",
            value: port_raw.clone(),
            reason: "must be an integer between 0 and 65535",
        })?;

        let secret = required("JWT_SECRET")?;
        if secret.is_empty() {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                value: secret,
                reason: "must not be empty",
            });
        }
        let ttl_minutes = match lookup("JWT_TTL_MINUTES") {
            Some(v) => Some(
                positive_int(&v)
                    .filter(|m| *m <= MAX_TTL_MINUTES)
                    .ok_or(ConfigError::Invalid {
                        name: "JWT_TTL_MINUTES",
                        value: v.clone(),
                        reason: "must be a positive integer of at most 100 years in minutes",
                    })?,
            ),
            None => None,
        };

        let database = DatabaseConfig {
            url: required("DATABASE_URL")?,
            name: lookup("DATABASE_NAME").filter(|v| !v.is_empty()),
            max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(v) => positive_int(&v)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or(ConfigError::Invalid {
                        name: "DATABASE_MAX_CONNECTIONS",
                        value: v.clone(),
                        reason: "must be a positive integer",
                    })?,
                None => 10,
            },
        };

        let cors = CorsConfig {
            allowed_origins: parse_list("CORS_ALLOWED_ORIGINS", &required("CORS_ALLOWED_ORIGINS")?, |s| {
                HeaderValue::from_str(s).ok()
            })?,
            allowed_methods: parse_list("CORS_ALLOWED_METHODS", &required("CORS_ALLOWED_METHODS")?, |s| {
                Method::from_bytes(s.to_ascii_uppercase().as_bytes()).ok()
            })?,
            allowed_headers: parse_list("CORS_ALLOWED_HEADERS", &required("CORS_ALLOWED_HEADERS")?, |s| {
                HeaderName::from_bytes(s.as_bytes()).ok()
            })?,
            allow_credentials: {
                let v = required("CORS_ALLOW_CREDENTIALS")?;
                parse_bool(&v).ok_or(ConfigError::Invalid {
                    name: "CORS_ALLOW_CREDENTIALS",
                    value: v.clone(),
                    reason: "must be one of true/false",
                })?
            },
        };

        Ok(Self {
            host,
            port,
            jwt: JwtConfig { secret, ttl_minutes },
            database,
            cors,
        })
    }
}

fn positive_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn parse_list<T, F>(name: &'static str, raw: &str, parse: F) -> Result<AllowList<T>, ConfigError>
where
    F: Fn(&str) -> Option<T>,
{
    let items: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if items.contains(&"*") {
        return Ok(AllowList::Any);
    }

    items
        .into_iter()
        .map(|item| {
            parse(item).ok_or_else(|| ConfigError::Invalid {
                name,
                value: item.to_string(),
                reason: "not a valid list entry",
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(AllowList::Only)
}
