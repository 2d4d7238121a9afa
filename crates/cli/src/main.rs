use clap::{Parser, Subcommand};
use slackbridge::channel::EventReceiver;
use slackbridge::config::Credentials;
use slackbridge::Adapter;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "slackbridge")]
#[command(about = "Slack Events API adapter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook endpoint. Requires <PREFIX>_SLACK_OAUTH_ACCESS_TOKEN and <PREFIX>_SLACK_SIGNING_SECRET (prefix defaults to LXBOT).
    Serve {
        /// Config file path (default: SLACKBRIDGE_CONFIG_PATH or ~/.slackbridge/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Webhook port (default from config or 1323)
        #[arg(long, short)]
        port: Option<u16>,

        /// Reply to every inbound message with its own text instead of only logging it.
        #[arg(long)]
        echo: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("slackbridge {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port, echo }) => {
            if let Err(e) = run_serve(config, port, echo).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
    echo: bool,
) -> anyhow::Result<()> {
    let (mut config, path) = slackbridge::config::load_config(config_path)?;
    log::debug!("using config {}", path.display());
    if let Some(p) = port {
        config.gateway.port = p;
    }
    let credentials = match Credentials::from_env(&config.slack.env_prefix) {
        Ok(c) => c,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let (adapter, events) = Adapter::boot(config, credentials).await?;
    let adapter = Arc::new(adapter);
    tokio::spawn(consume(adapter.clone(), events, echo));
    adapter.run().await
}

/// Stand-in for the bot logic: log each envelope, optionally echo it back.
async fn consume(adapter: Arc<Adapter>, mut events: EventReceiver, echo: bool) {
    while let Some(envelope) = events.recv().await {
        match serde_json::to_string(&envelope) {
            Ok(json) => log::info!("envelope: {}", json),
            Err(e) => log::warn!("envelope not serializable: {}", e),
        }
        if echo && !envelope.message.text.is_empty() {
            if let Err(e) = adapter.reply_envelope(&envelope).await {
                log::warn!("echo reply failed: {}", e);
            }
        }
    }
}
