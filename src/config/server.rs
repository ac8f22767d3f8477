//! Server settings read from the environment, and the CORS policy.

use crate::errors::{Error, Result};
use axum::http::{HeaderName, HeaderValue, Method, header};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::database;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the HTTP listener binds (`BIND_ADDR`)
    pub bind_addr: SocketAddr,
    /// Store location (`DATABASE_URL`)
    pub database_url: String,
    /// Seed file (`BOX_OFFICE_CONFIG`)
    pub config_path: PathBuf,
}

impl ServerConfig {
    /// Reads the settings, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let config_path =
            env::var("BOX_OFFICE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Ok(Self {
            bind_addr: parse_bind_addr(&bind_addr)?,
            database_url: database::get_database_url(),
            config_path: PathBuf::from(config_path),
        })
    }
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr> {
    raw.parse().map_err(|e| Error::Config {
        message: format!("Invalid BIND_ADDR '{raw}': {e}"),
    })
}

/// CORS policy for the API, origins taken from `CORS_ALLOWED_ORIGINS`.
pub fn create_cors_layer() -> CorsLayer {
    let origins =
        env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string());

    CorsLayer::new()
        .allow_origin(allowed_origins(&origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

fn allowed_origins(raw: &str) -> AllowOrigin {
    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, allowing any origin");
        AllowOrigin::any()
    } else {
        tracing::info!("CORS: Configured with {} allowed origin(s)", origins.len());
        AllowOrigin::list(origins)
    }
}
