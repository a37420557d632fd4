use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Run the relay server
    Serve {
        /// Set the server host address
        #[arg(long)]
        host: Option<String>,

        /// Set the server port
        #[arg(long)]
        port: Option<String>,
    },
    /// Start a chat session against a running relay server
    Chat {
        /// Base URL of the relay server
        #[arg(long, default_value = "http://127.0.0.1:3001")]
        server: String,

        /// Where settings are stored
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

fn default_settings_path() -> PathBuf {
    env::var("SQUARE_SETTINGS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./.square/settings.json"))
}

pub async fn run() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Chat { server, settings }) => {
            let settings_path = settings.unwrap_or_else(default_settings_path);
            chat::run(&server, &settings_path).await?;
        }
        None => {}
    }

    Ok(())
}
