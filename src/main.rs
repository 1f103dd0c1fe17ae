use anyhow::Context;
use chat_relay::config::{self, RelayConfig};
use chat_relay::relay::RelayHandler;
use chat_relay::server;
use chat_relay::upstream::OpenAIClient;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "chat-relay")]
#[command(about = "Relay chat messages and conversation history to the OpenAI chat completions API")]
struct CliArgs {
    /// Host address to bind the server
    #[arg(long, default_value = config::DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server
    #[arg(long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Path of the .env file holding OPENAI_API_KEY (default: next to the
    /// executable, then the working directory)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Timeout in seconds for the upstream completion call
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    /// Origins allowed to call the server from a browser (repeatable)
    #[arg(long = "allowed-origin", num_args = 1..)]
    allowed_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = config::DEFAULT_MAX_PAYLOAD_SIZE)]
    max_payload_size: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,
}

impl CliArgs {
    fn apply(&self, config: &mut RelayConfig) {
        config.host = self.host.clone();
        config.port = self.port;
        config.request_timeout_secs = self.request_timeout_secs;
        config.max_payload_size = self.max_payload_size;
        if !self.allowed_origins.is_empty() {
            config.allowed_origins = self.allowed_origins.clone();
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    server::init_logging(args.log_level)?;

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()));
    let env_file = config::resolve_env_path(args.env_file.as_deref(), exe_dir.as_deref());
    let found = config::load_env_file(&env_file)?;
    log::info!(".env file path: {}", env_file.display());
    log::info!(".env file exists: {}", found);

    let mut relay_config = match RelayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            return Err(e.into());
        }
    };
    args.apply(&mut relay_config);
    relay_config.validate()?;
    log::info!(
        "Loaded API key: {}",
        config::mask_secret(&relay_config.api_key)
    );

    let client = OpenAIClient::new(
        &relay_config.api_key,
        &relay_config.api_base,
        Duration::from_secs(relay_config.request_timeout_secs),
    )
    .context("Failed to build upstream client")?;
    let relay = RelayHandler::new(Arc::new(client));

    server::startup(relay_config, relay).await?;
    Ok(())
}
