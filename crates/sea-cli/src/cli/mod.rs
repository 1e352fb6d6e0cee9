//! CLI entry and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sea_core::api::{SeaClient, SeaClientConfig};
use sea_core::config;
use sea_core::storage::{FileStorage, KeyValueStorage};

mod commands;

#[derive(Parser)]
#[command(name = "sea")]
#[command(version)]
#[command(about = "SEA Smart Engineering Assistant client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend API base URL (overrides config; SEA_BASE_URL takes precedence)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email address
        #[arg(long)]
        email: String,

        /// Account password (prompted on stdin when omitted)
        #[arg(long, env = "SEA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out (clear the stored session token)
    Logout,

    /// Show whether a session token is stored
    Status,

    /// Ask a single question
    Ask {
        /// The question to send
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Print the answer as sanitized HTML instead of markdown
        #[arg(long)]
        html: bool,
    },

    /// Hold a conversation, one question per stdin line
    Chat {
        /// Print answers as sanitized HTML instead of markdown
        #[arg(long)]
        html: bool,
    },

    /// Search documents
    Search {
        /// Search terms
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Print the download URL of a document
    DocUrl {
        /// Document content hash
        #[arg(value_name = "HASH")]
        hash: String,

        /// Open the URL in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Render markdown to sanitized HTML
    Render {
        /// Markdown file to read (stdin when omitted)
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the backend base URL in the config file
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

/// Initialize the tracing subscriber for logging.
fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Warnings only by default; RUST_LOG overrides.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sea=warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

/// Builds a client over the persisted storage under `SEA_HOME`.
fn open_client(config: &config::Config, base_url: Option<&str>) -> Result<SeaClient> {
    let client_config =
        SeaClientConfig::from_config(config, base_url).context("resolve base URL")?;
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::default_location());
    SeaClient::new(client_config, storage)
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, base_url } = cli;

    let connect = || -> Result<SeaClient> {
        let config = config::Config::load().context("load config")?;
        open_client(&config, base_url.as_deref())
    };

    match command {
        Commands::Login { email, password } => {
            commands::auth::login(&connect()?, &email, password).await
        }
        Commands::Logout => {
            commands::auth::logout(&connect()?);
            Ok(())
        }
        Commands::Status => {
            commands::auth::status(&connect()?);
            Ok(())
        }
        Commands::Ask { question, html } => {
            commands::ask::ask(&connect()?, &question, html).await
        }
        Commands::Chat { html } => commands::ask::chat(&connect()?, html).await,
        Commands::Search { query } => commands::documents::search(&connect()?, &query).await,
        Commands::DocUrl { hash, open } => {
            commands::documents::doc_url(&connect()?, &hash, open);
            Ok(())
        }
        Commands::Render { file } => commands::render::run(file.as_deref()),
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetBaseUrl { url } => commands::config::set_base_url(&url),
        },
    }
}
