#[macro_use]
extern crate log;
#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

mod bot;
mod cli;
mod command;
mod config;
mod error;
mod handler;
mod logging;
mod platform;
mod service;
mod state;
mod storage;
mod utils;

#[cfg(test)]
mod tests;

use clap::Parser;

use bot::BotService;
use cli::{Cli, CliCommand};
use config::{AppConfig, DatabaseConfig, LogConfig};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(CliCommand::Run) {
        CliCommand::Run => run_bot().await,
        CliCommand::Migrate { action } => {
            logging::init(&LogConfig::default())?;
            cli::run_migrate(&DatabaseConfig::from_env()?, &action).await?;
            Ok(())
        }
    }
}

async fn run_bot() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let log_file = logging::init(&config.log)?;

    info!("Starting bot...");
    let upload_url = config.upload.log_url.clone();
    let http_config = config.http.clone();

    let state = AppState::new(config).await?;
    let bot_service = BotService::new(state)?;

    if let Err(e) = bot_service.start().await {
        error!("Bot stopped with error: {}", e);
    }
    info!("Bot stopped");

    if let (Some(endpoint), Some(path)) = (upload_url, log_file) {
        let client = utils::http::create_upload_client(&http_config)?;
        match logging::upload_log(&client, &endpoint, &path).await {
            Ok(outcome) => info!("Log upload finished: {:?}", outcome),
            Err(e) => error!("Failed to upload log {}: {}", path.display(), e),
        }
    }

    Ok(())
}
