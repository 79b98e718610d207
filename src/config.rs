use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::business::BusinessProfile;
use crate::constants::*;
use crate::error::{BotError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Public base URL Twilio uses to reach this service
    pub public_url: String,
    pub openrouter: OpenRouterConfig,
    pub business: BusinessProfile,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            openrouter: OpenRouterConfig::default(),
            business: BusinessProfile::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: OPENROUTER_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_LOG_DIR.to_string(),
            file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl OpenRouterConfig {
    /// A key counts as configured only if it is non-empty and not a truncated preview.
    pub fn api_key_configured(&self) -> bool {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) => !key.is_empty() && !key.contains(API_KEY_PLACEHOLDER_MARKER),
            None => false,
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the TOML file, then the process environment.
    ///
    /// An explicit `path` must exist. Without one, `config.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BotError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from an environment lookup. `PORT` always wins over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get(ENV_PORT) {
            self.server.port = parse_var(ENV_PORT, &port)?;
        }
        if let Some(host) = get(ENV_HOST) {
            self.server.host = host;
        }

        if let Some(url) = get(ENV_PUBLIC_URL) {
            self.public_url = url;
        } else if let Some(domain) = get(ENV_RAILWAY_PUBLIC_DOMAIN) {
            self.public_url = format!("https://{}", domain.trim());
        }

        if let Some(key) = get(ENV_OPENROUTER_API_KEY) {
            self.openrouter.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = get(ENV_OPENROUTER_API_URL) {
            self.openrouter.api_url = url;
        }
        if let Some(model) = get(ENV_OPENROUTER_MODEL) {
            self.openrouter.model = model;
        }
        if let Some(max_tokens) = get(ENV_OPENROUTER_MAX_TOKENS) {
            self.openrouter.max_tokens = parse_var(ENV_OPENROUTER_MAX_TOKENS, &max_tokens)?;
        }
        if let Some(timeout) = get(ENV_OPENROUTER_TIMEOUT_SECONDS) {
            self.openrouter.timeout_seconds = parse_var(ENV_OPENROUTER_TIMEOUT_SECONDS, &timeout)?;
        }

        if let Some(dir) = get(ENV_LOG_DIR) {
            self.logging.directory = dir;
        }
        if let Some(enabled) = get(ENV_METRICS_ENABLED) {
            self.metrics.enabled = parse_var(ENV_METRICS_ENABLED, &enabled.to_lowercase())?;
        }

        Ok(())
    }

    /// URL to paste into the Twilio console.
    pub fn webhook_url(&self) -> String {
        format!(
            "{}{}",
            self.public_url.trim_end_matches('/'),
            WHATSAPP_WEBHOOK_ROUTE
        )
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| BotError::Config(format!("Invalid value '{}' for {}: {}", value, name, e)))
}
