use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

pub const DEFAULT_MAX_BODY_BYTES: &str = "20971520";

pub const DEFAULT_API_URL: &str = "https://cautela-back-production.up.railway.app/api";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_url: String,
    pub upstream_timeout: Duration,
    pub cors_max_age: Duration,
    /// Cap for signature bodies, which carry a camera photo.
    pub max_body_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("RUST_PORT", "1111")?,
            api_url: try_load::<String>("CAUTELA_API_URL", DEFAULT_API_URL)?
                .trim_end_matches('/')
                .to_string(),
            upstream_timeout: Duration::from_millis(try_load("UPSTREAM_TIMEOUT_MS", "5000")?),
            cors_max_age: Duration::from_secs(try_load("CORS_MAX_AGE_SECS", "3600")?),
            max_body_bytes: try_load("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow!("{e}")
        })
        .with_context(|| format!("Environment misconfigured: {key}={raw}"))
}
