//! ProShop CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! proshop-cli migrate
//!
//! # Wipe and reload the sample catalog and accounts
//! proshop-cli seed
//!
//! # Wipe all data without reloading
//! proshop-cli seed --destroy
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "proshop-cli")]
#[command(author, version, about = "ProShop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with sample users and products
    Seed {
        /// Delete all data instead of seeding
        #[arg(short, long)]
        destroy: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { destroy } => {
            if destroy {
                commands::seed::destroy().await
            } else {
                commands::seed::import().await
            }
        }
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}
