use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use storefront_checkout::{CheckoutBridge, Storefront};
use storefront_client::CommerceClient;
use storefront_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod browse;
mod buy;
mod terminal_checkout;

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Browse the store catalog and buy packages from the terminal")]
struct Cli {
    /// Print the community support link
    #[arg(long)]
    support: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List categories with their slugs and routes
    Categories,
    /// List the packages in a category (defaults to the first category)
    Browse {
        /// Category slug, e.g. rangos
        slug: Option<String>,
    },
    /// Show one package in detail
    Show {
        /// Package id
        package_id: i64,
    },
    /// Buy one unit of a package through the hosted checkout
    Buy {
        /// Package id
        package_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = storefront_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.support {
        println!("Community and support: {}", config.support_url);
    }
    let Some(command) = cli.command else {
        if !cli.support {
            Cli::command().print_help()?;
        }
        return Ok(());
    };

    let client = Arc::new(
        CommerceClient::from_config(&config).context("failed to build commerce client")?,
    );
    tracing::debug!(env = %config.env, api = %config.api_base_url, "storefront cli starting");

    match command {
        Commands::Categories => browse::run_categories(&catalog_store(&config, client)).await,
        Commands::Browse { slug } => {
            browse::run_browse(&catalog_store(&config, client), slug.as_deref()).await
        }
        Commands::Show { package_id } => {
            browse::run_show(&catalog_store(&config, client), package_id).await
        }
        Commands::Buy { package_id } => buy::run_buy(&config, client, package_id).await,
    }
}

/// A storefront for read-only commands; it has no checkout capability.
fn catalog_store(config: &AppConfig, client: Arc<CommerceClient>) -> Storefront<CommerceClient> {
    Storefront::new(
        client,
        CheckoutBridge::unavailable(config.checkout.clone()),
        config,
    )
}
