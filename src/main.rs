use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

use whatsapp_assistant::app::ports::ChatCompletionPort;
use whatsapp_assistant::config::AppConfig;
use whatsapp_assistant::infra::OpenRouterClient;
use whatsapp_assistant::observability::{self, metrics};
use whatsapp_assistant::server::{self, AppState};
use whatsapp_assistant::types::ChatMessage;

const CHECK_SYSTEM_PROMPT: &str = "Eres un asistente útil. Responde en español.";

#[derive(Parser)]
#[command(name = "whatsapp-assistant")]
#[command(about = "WhatsApp virtual assistant webhook for a school")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook HTTP server (default)
    Serve {
        /// Port to listen on; overrides PORT and the config file
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send one test prompt to OpenRouter and print the answer
    CheckLlm {
        #[arg(long, default_value = "Hola, ¿puedes saludarme?")]
        prompt: String,
    },
}

async fn serve(mut config: AppConfig, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let metrics_handle = if config.metrics.enabled {
        match metrics::init() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to initialize metrics: {}", e);
                None
            }
        }
    } else {
        None
    };

    let replies = whatsapp_assistant::build_reply_service(&config)?;
    let state = AppState::new(config, replies, metrics_handle);
    server::start_server(state).await?;
    Ok(())
}

async fn check_llm(config: &AppConfig, prompt: String) -> Result<()> {
    if !config.openrouter.api_key_configured() {
        warn!(
            "OPENROUTER_API_KEY is missing or truncated (contains '...'); set the full key first"
        );
        anyhow::bail!("OpenRouter API key not configured");
    }

    let client = OpenRouterClient::new(&config.openrouter)?;
    info!(
        model = %client.model(),
        url = %config.openrouter.api_url,
        "Testing OpenRouter connection"
    );

    let messages = [ChatMessage::system(CHECK_SYSTEM_PROMPT), ChatMessage::user(prompt)];
    match client.complete(&messages).await {
        Ok(answer) => {
            println!("✅ Conexión exitosa!");
            println!("🤖 Respuesta: {}", answer);
            Ok(())
        }
        Err(e) => {
            error!("OpenRouter check failed: {}", e);
            Err(e).context("OpenRouter connection test failed")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = observability::init_logging(&config.logging);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, port).await,
        Commands::CheckLlm { prompt } => check_llm(&config, prompt).await,
    }
}
