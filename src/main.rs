use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use invoice_dashboard::{config, db, server};

#[derive(Parser)]
#[command(name = "invoice_dashboard", about = "Invoice dashboard web server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard (default)
    Serve {
        /// Address to bind, overriding BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Print a bcrypt hash for seeding the users table
    HashPassword {
        password: String,
        #[arg(long, default_value_t = bcrypt::DEFAULT_COST)]
        cost: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("invoice_dashboard=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(bind).await,
        Command::HashPassword { password, cost } => {
            println!("{}", bcrypt::hash(password, cost)?);
            Ok(())
        }
    }
}

async fn serve(bind: Option<SocketAddr>) -> Result<()> {
    // Load configuration
    let config = config::init()?;
    info!(?config, "configuration loaded");

    let addr = match bind {
        Some(addr) => addr,
        None => config
            .bind_addr
            .parse()
            .with_context(|| format!("invalid BIND_ADDR '{}'", config.bind_addr))?,
    };

    // Initialize database connection
    let store = db::init(&config).await?;
    let state = server::AppState::new(store, &config)?;

    server::serve(addr, state).await
}
