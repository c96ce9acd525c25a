use std::time::Duration;

use anyhow::{bail, Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the ML inference service. `None` keeps every request on
    /// the local fallback path.
    pub ml_service_url: Option<String>,
    pub ml_timeout: Duration,

    pub upload_dir: String,
    pub upload_max_bytes: usize,
    pub fallback_seed: Option<u64>,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ml_service_url: None,
            ml_timeout: Duration::from_millis(10_000),
            upload_dir: "uploads".to_string(),
            upload_max_bytes: 50 * 1024 * 1024,
            fallback_seed: None,
            bind_addr: "0.0.0.0:4000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let ml_service_url = var("ML_SERVICE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty());

        let ml_timeout = match var("ML_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(parse(&v, "ML_TIMEOUT_MS")?),
            None => defaults.ml_timeout,
        };
        let upload_max_bytes = match var("UPLOAD_MAX_BYTES") {
            Some(v) => parse(&v, "UPLOAD_MAX_BYTES")?,
            None => defaults.upload_max_bytes,
        };
        let fallback_seed = var("FALLBACK_SEED").map(|v| parse(&v, "FALLBACK_SEED")).transpose()?;

        let upload_dir = var("UPLOAD_DIR").unwrap_or(defaults.upload_dir);
        let bind_addr = var("GATEWAY_BIND_ADDR").unwrap_or(defaults.bind_addr);

        if let Some(url) = &ml_service_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("ML_SERVICE_URL must start with http:// or https://");
            }
        }
        if ml_timeout.is_zero() {
            bail!("ML_TIMEOUT_MS must be greater than zero");
        }

        Ok(Self {
            ml_service_url,
            ml_timeout,
            upload_dir,
            upload_max_bytes,
            fallback_seed,
            bind_addr,
        })
    }
}

fn parse<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim().parse().with_context(|| format!("Invalid value for env var {key}: {raw:?}"))
}
