use anyhow::Context;
use clap::{Parser, Subcommand};
use pagetree::config::PageTreeConfig;
use pagetree::database::sqlite::SqliteRepository;
use pagetree::services::block_migration::migrate_block_settings;
use pagetree::{AppState, app, db};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pagetree", about = "Page tree, block and snapshot store for a CMS")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Rename the legacy `name` block setting to `code` and drop `orientation`
    /// from containers
    MigrateBlockSettings {
        /// Also set each migrated block's name from its code
        #[arg(long)]
        update_name: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagetree=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Arc::new(PageTreeConfig::from_env()?);
    let pool = db::connect(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::MigrateBlockSettings { update_name } => {
            let repo = SqliteRepository::new(pool);
            let report = migrate_block_settings(&repo, update_name).await?;
            println!("Migrated {} blocks", report.migrated);
        }
        Command::Serve => {
            let state = AppState::new(pool, config.clone());

            let listener = tokio::net::TcpListener::bind(&config.bind_address)
                .await
                .with_context(|| format!("Failed to bind {}", config.bind_address))?;
            tracing::info!("Server listening on http://{}", config.bind_address);

            axum::serve(listener, app(state)).await?;
        }
    }

    Ok(())
}
