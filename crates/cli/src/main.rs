//! Zalo CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive conversation (the default)
//! - `ask`      — Answer a single line and exit
//! - `learn`    — Teach a topic
//! - `forget`   — Remove a topic or one of its responses
//! - `topics`   — List learned topics
//! - `export`   — Back up the knowledge base
//! - `import`   — Merge a knowledge file
//! - `status`   — Show paths and counts
//! - `onboard`  — Write a default config

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use zalo_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "zalo",
    about = "Zalo — a small text assistant that learns",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep learned knowledge in memory only for this run
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively (default)
    Chat,

    /// Answer a single line, e.g. `zalo ask "list tasks"`
    Ask {
        /// The line to answer
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Teach Zalo something about a topic
    Learn {
        topic: String,

        /// The response to file under the topic
        info: String,

        /// Only prefer this response right after the given topic
        #[arg(short, long)]
        context: Option<String>,
    },

    /// Forget a topic, or only one of its responses
    Forget {
        topic: String,

        /// Exact response text to remove
        response: Option<String>,
    },

    /// List learned topics
    Topics,

    /// Write the knowledge base to a backup file
    Export {
        /// Destination (defaults to the knowledge file + `.backup`)
        path: Option<PathBuf>,
    },

    /// Merge topics from another knowledge file
    Import { path: PathBuf },

    /// Show configuration and store status
    Status,

    /// Write a default configuration file
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with replies on stdout.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ephemeral = cli.ephemeral;
    let config = || AppConfig::load().map_err(|e| format!("Failed to load config: {e}"));

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run(&config()?, ephemeral).await?,
        Commands::Ask { message } => {
            commands::chat::ask(&config()?, ephemeral, &message.join(" "))?
        }
        Commands::Learn {
            topic,
            info,
            context,
        } => commands::knowledge::learn(&config()?, ephemeral, &topic, &info, context.as_deref())?,
        Commands::Forget { topic, response } => {
            commands::knowledge::forget(&config()?, ephemeral, &topic, response.as_deref())?
        }
        Commands::Topics => commands::knowledge::topics(&config()?, ephemeral)?,
        Commands::Export { path } => {
            commands::knowledge::export(&config()?, ephemeral, path.as_deref())?
        }
        Commands::Import { path } => commands::knowledge::import(&config()?, ephemeral, &path)?,
        Commands::Status => commands::status::run(&config()?, ephemeral)?,
        Commands::Onboard => commands::onboard::run()?,
    }

    Ok(())
}
