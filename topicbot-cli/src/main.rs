//! topicbot CLI: run the Telegram bot or create the database schema. Config from env and
//! optional CLI args.

use anyhow::Result;
use clap::Parser;
use topicbot_cli::config::database_url_from_env;
use topicbot_cli::{run_bot, run_migrate, BotConfig, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = BotConfig::load(token)?;
            run_bot(config).await
        }
        Commands::Migrate => run_migrate(&database_url_from_env()).await,
    }
}
