//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "topicbot")]
#[command(about = "Telegram topic subscription bot", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Create the database schema at DATABASE_URL and exit.
    Migrate,
}
