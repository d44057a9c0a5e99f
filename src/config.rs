use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_API_HOST: &str = "https://api.stability.ai";
pub const DEFAULT_ENGINE_ID: &str = "stable-diffusion-xl-1024-v1-0";
pub const DEFAULT_ASSET_SERVER_URL: &str = "http://localhost:5001";

#[derive(Debug, Clone)]
pub struct StabilityConfig {
    pub api_key: Option<String>,
    pub api_host: String,
    pub engine_id: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AssetServerConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub stability: StabilityConfig,
    pub asset_server: AssetServerConfig,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        StabilityConfig {
            api_key: None,
            api_host: DEFAULT_API_HOST.to_string(),
            engine_id: DEFAULT_ENGINE_ID.to_string(),
            timeout_secs: None,
        }
    }
}

impl StabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `Error::Config` when `STABILITY_TIMEOUT_SECS` is set but is
    /// not a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("STABILITY_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let api_host = env::var("STABILITY_API_HOST").unwrap_or_else(|_| DEFAULT_API_HOST.to_string());
        let engine_id =
            env::var("STABILITY_ENGINE_ID").unwrap_or_else(|_| DEFAULT_ENGINE_ID.to_string());
        let timeout_secs = parse_timeout(env::var("STABILITY_TIMEOUT_SECS").ok())?;

        Ok(StabilityConfig {
            api_key,
            api_host,
            engine_id,
            timeout_secs,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    pub fn with_engine(mut self, engine_id: impl Into<String>) -> Self {
        self.engine_id = engine_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The key is required for every request; callers check it before any
    /// network traffic happens.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::Config("STABILITY_API_KEY is not set (environment or .env)".into())
        })
    }

    pub fn generation_url(&self) -> String {
        format!(
            "{}/v1/generation/{}/text-to-image",
            self.api_host.trim_end_matches('/'),
            self.engine_id
        )
    }
}

/// Blank means unset. Anything else must parse as seconds.
fn parse_timeout(raw: Option<String>) -> Result<Option<u64>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            Error::Config(format!(
                "STABILITY_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                value
            ))
        }),
    }
}

impl Default for AssetServerConfig {
    fn default() -> Self {
        AssetServerConfig {
            base_url: DEFAULT_ASSET_SERVER_URL.to_string(),
        }
    }
}

impl AssetServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url =
            env::var("ASSET_SERVER_URL").unwrap_or_else(|_| DEFAULT_ASSET_SERVER_URL.to_string());

        AssetServerConfig { base_url }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        Ok(Config {
            stability: StabilityConfig::from_env()?,
            asset_server: AssetServerConfig::from_env(),
        })
    }

    pub fn with_stability(mut self, config: StabilityConfig) -> Self {
        self.stability = config;
        self
    }

    pub fn with_asset_server(mut self, config: AssetServerConfig) -> Self {
        self.asset_server = config;
        self
    }
}
