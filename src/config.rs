//! Runtime configuration read from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::fir::handlers::DEFAULT_JSON_LIMIT;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub typst_bin: PathBuf,
    pub typst_font_paths: Vec<PathBuf>,
    pub render_pool_size: usize,
    pub render_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
    pub json_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            typst_bin: PathBuf::from("typst"),
            typst_font_paths: Vec::new(),
            render_pool_size: 4,
            render_timeout: Duration::from_secs(30),
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or(defaults.host);
        let port = match var("PORT") {
            Some(v) => parse_number::<u16>("PORT", &v)?,
            None => defaults.port,
        };
        let typst_bin = var("TYPST_BIN")
            .map(PathBuf::from)
            .unwrap_or(defaults.typst_bin);
        let typst_font_paths = var("TYPST_FONT_PATHS")
            .map(|v| env::split_paths(&v).collect())
            .unwrap_or(defaults.typst_font_paths);
        let render_pool_size = match var("RENDER_POOL_SIZE") {
            Some(v) => positive("RENDER_POOL_SIZE", &v)?,
            None => defaults.render_pool_size,
        };
        let render_timeout = match var("RENDER_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(positive("RENDER_TIMEOUT_SECS", &v)? as u64),
            None => defaults.render_timeout,
        };
        let cors_allowed_origins = match var("CORS_ALLOWED_ORIGINS") {
            Some(v) => v
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.cors_allowed_origins,
        };
        let json_limit = match var("JSON_LIMIT_BYTES") {
            Some(v) => positive("JSON_LIMIT_BYTES", &v)?,
            None => defaults.json_limit,
        };

        Ok(Self {
            host,
            port,
            typst_bin,
            typst_font_paths,
            render_pool_size,
            render_timeout,
            cors_allowed_origins,
            json_limit,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: "not a valid number",
    })
}

fn positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    let n = parse_number::<usize>(key, value)?;
    if n == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be at least 1",
        });
    }
    Ok(n)
}
