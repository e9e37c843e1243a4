pub mod app;
pub mod bot;
pub mod config;
pub mod delivery;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod pipeline;
pub mod policy;
pub mod registry;

use anyhow::{bail, Context, Result};
use app::AppContext;
use bot::Handler;
use config::Config;
use serenity::all::{Client, GatewayIntents};
use std::sync::Arc;
use tracing::{info, warn};

/// Connect to Discord and serve interactions until shutdown.
pub async fn run(config: Config) -> Result<()> {
    if config.discord.bot_token.trim().is_empty() {
        bail!("No bot token configured (set discord.bot_token or DISCORD_BOT_TOKEN)");
    }

    info!(
        "Work dir: {}, registry: {}",
        config.storage.work_dir, config.storage.data_file
    );
    tokio::fs::create_dir_all(&config.storage.work_dir)
        .await
        .with_context(|| format!("Failed to create work dir: {}", config.storage.work_dir))?;

    let token = config.discord.bot_token.clone();
    let app = Arc::new(AppContext::new(config));
    app.restore_panels().await;

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;
    let mut client = Client::builder(&token, intents)
        .event_handler(Handler::new(app))
        .await
        .context("Failed to create Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutting down");
        shard_manager.shutdown_all().await;
    });

    client.start().await.context("Discord client stopped")?;
    Ok(())
}
