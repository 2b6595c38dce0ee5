//! Go Marketplace CLI - Inspect and edit a stored cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cli list
//!
//! # Add a product (adding it again bumps the quantity)
//! gm-cli add --id p1 --title "Backpack" --image-url https://cdn.example.com/p1.png --price 49.90
//!
//! # Change quantities
//! gm-cli increment p1
//! gm-cli decrement p1
//!
//! # Totals
//! gm-cli summary
//!
//! # Empty the cart
//! gm-cli clear
//! ```
//!
//! The cart file and key come from `CART_STORE_PATH` / `CART_STORAGE_KEY`
//! (or `.env`), overridden by `--store` / `--key`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use go_marketplace_core::Price;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Go Marketplace cart tools")]
struct Cli {
    /// Cart store file (overrides `CART_STORE_PATH`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Storage key (overrides `CART_STORAGE_KEY`)
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cart lines
    List,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long, default_value = "")]
        image_url: String,

        /// Unit price (e.g. 19.99)
        #[arg(long)]
        price: Price,
    },
    /// Increment a line's quantity
    Increment {
        /// Product ID
        id: String,
    },
    /// Decrement a line's quantity, removing it at zero
    Decrement {
        /// Product ID
        id: String,
    },
    /// Show item count and total price
    Summary,
    /// Remove every line
    Clear,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gm_cli=info,go_marketplace_cart=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let config = commands::load_config(cli.store, cli.key)?;
    let cart = commands::open(&config).await;

    match cli.command {
        Commands::List => commands::cart::list(&cart),
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::cart::add(&cart, id, title, image_url, price).await?,
        Commands::Increment { id } => commands::cart::increment(&cart, id).await?,
        Commands::Decrement { id } => commands::cart::decrement(&cart, id).await?,
        Commands::Summary => commands::cart::summary(&cart),
        Commands::Clear => commands::cart::clear(&cart).await?,
    }
    Ok(())
}
