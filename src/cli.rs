use clap::{Parser, Subcommand};

use crate::config::DatabaseConfig;
use crate::storage::{migration, StorageError, TursoClient};

#[derive(Parser, Debug)]
#[command(name = "relaystash")]
#[command(about = "Relays media behind TikTok, Twitter, Instagram and YouTube Shorts links to Telegram")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum CliCommand {
    /// Run the bot (default)
    Run,
    /// Manage the database schema
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum MigrateAction {
    /// Apply every pending migration
    Up,
    /// Revert migrations
    Down {
        /// Revision to keep applied, everything is reverted when omitted
        #[arg(long)]
        to: Option<String>,
    },
    /// Print the applied revision
    Current,
}

pub async fn run_migrate(database: &DatabaseConfig, action: &MigrateAction) -> Result<(), StorageError> {
    let client = TursoClient::new(database).await?;
    let conn = client.connection();

    match action {
        MigrateAction::Up => {
            let applied = migration::migrate_up(&conn).await?;
            info!("Applied {} migrations", applied);
        }
        MigrateAction::Down { to } => {
            let reverted = migration::migrate_down(&conn, to.as_deref()).await?;
            info!("Reverted {} migrations", reverted);
        }
        MigrateAction::Current => {}
    }

    let current = migration::current_revision(&conn).await?;
    info!("Database is at revision {}", current.as_deref().unwrap_or("base"));
    Ok(())
}
