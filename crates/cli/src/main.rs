//! Stockroom CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! stockroom migrate
//!
//! # Create a user (password read from STOCKROOM_NEW_USER_PASSWORD)
//! stockroom user create -u keeper -e keeper@example.com
//!
//! # Drop revoked-token records that have expired anyway
//! stockroom tokens purge
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create users through the registration rules
//! - `tokens purge` - Delete expired revoked-token records

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about = "Stockroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage the revoked-token list
    Tokens {
        #[command(subcommand)]
        action: TokensAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Given name
        #[arg(long)]
        first_name: Option<String>,

        /// Family name
        #[arg(long)]
        last_name: Option<String>,
    },
}

#[derive(Subcommand)]
enum TokensAction {
    /// Delete revoked-token records past their expiry
    Purge,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                first_name,
                last_name,
            } => {
                commands::user::create_user(username, email, first_name, last_name).await?;
            }
        },
        Commands::Tokens { action } => match action {
            TokensAction::Purge => {
                commands::tokens::purge().await?;
            }
        },
    }
    Ok(())
}
