use anyhow::Result;
use clap::Parser;
use haven_control_bot_lib::config::{default_config_path, load_config};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Haven control panel bot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Directory for temporary downloads (overrides config file)
    #[arg(long)]
    work_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "haven_control_bot=debug,haven_control_bot_lib=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(default_config_path);
    info!("Loading config from {}", config_path.display());
    let mut config = load_config(&config_path)?;
    config.apply_env();

    if let Some(token) = args.bot_token {
        config.discord.bot_token = token;
    }
    if let Some(work_dir) = args.work_dir {
        config.storage.work_dir = work_dir;
    }

    haven_control_bot_lib::run(config).await
}
