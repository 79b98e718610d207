pub mod business;
pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod server;
pub mod types;

// Application use cases and the adapters behind their ports
pub mod app;
pub mod infra;

use std::sync::Arc;
use tracing::{info, warn};

use crate::app::ports::ChatCompletionPort;
use crate::app::ReplyService;
use crate::config::AppConfig;
use crate::infra::OpenRouterClient;

/// Build the reply service from config, wiring OpenRouter only when a real key is present.
pub fn build_reply_service(config: &AppConfig) -> error::Result<ReplyService> {
    if !config.openrouter.api_key_configured() {
        warn!("OPENROUTER_API_KEY not configured, replying with the placeholder greeting");
        return Ok(ReplyService::without_model(config.business.clone()));
    }

    let client = OpenRouterClient::new(&config.openrouter)?;
    info!(model = %client.model(), "OpenRouter replies enabled");
    let chat: Arc<dyn ChatCompletionPort> = Arc::new(client);
    Ok(ReplyService::new(config.business.clone(), Some(chat)))
}
