/// Route and environment constants shared by the server, config and CLI.
/// Keeping them here avoids magic strings drifting between handlers and tests.

// Routes
pub const ROOT_ROUTE: &str = "/";
pub const TEST_ROUTE: &str = "/test";
pub const HEALTH_ROUTE: &str = "/health";
pub const METRICS_ROUTE: &str = "/metrics";
pub const WHATSAPP_WEBHOOK_ROUTE: &str = "/webhook/whatsapp";

// Server defaults (the container declares 8080)
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_PUBLIC_URL: &str = "https://TU-URL.railway.app";

// OpenRouter defaults
pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";
pub const DEFAULT_MAX_TOKENS: u32 = 100;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Marker found in keys copied from truncated dashboard previews (`sk-or-v1-a56...if7`)
pub const API_KEY_PLACEHOLDER_MARKER: &str = "...";

// Logging defaults
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE_PREFIX: &str = "whatsapp-assistant.log";

// Environment variable names
pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PUBLIC_URL: &str = "PUBLIC_URL";
pub const ENV_RAILWAY_PUBLIC_DOMAIN: &str = "RAILWAY_PUBLIC_DOMAIN";
pub const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_OPENROUTER_API_URL: &str = "OPENROUTER_API_URL";
pub const ENV_OPENROUTER_MODEL: &str = "OPENROUTER_MODEL";
pub const ENV_OPENROUTER_MAX_TOKENS: &str = "OPENROUTER_MAX_TOKENS";
pub const ENV_OPENROUTER_TIMEOUT_SECONDS: &str = "OPENROUTER_TIMEOUT_SECONDS";
pub const ENV_LOG_DIR: &str = "LOG_DIR";
pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";
