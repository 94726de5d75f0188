use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use onerecord_client::SubscriberClient;
use onerecord_core::logistics::type_of;
use onerecord_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "onerecord", version, about = "ONE Record server tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Inspect companies stored in the database
    Companies {
        #[command(subcommand)]
        action: CompanyCommands,
    },

    /// Push a logistics object to a subscribing ONE Record server
    Publish {
        /// Base URL of the subscriber server
        #[arg(short, long, env = "ONE_RECORD_SUBSCRIBER_URL")]
        server: String,

        /// Path to the logistics object (JSON-LD)
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// List companies
    List {
        /// Number of companies to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("onerecord=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => {
            let db = connect_db().await?;
            db.migrate().await.context("Failed to run migrations")?;
            println!("Migrations applied");
        }
        Commands::Companies {
            action: CompanyCommands::List { limit },
        } => {
            let db = connect_db().await?;
            cmd_list_companies(&db, limit).await?;
        }
        Commands::Publish { server, file } => {
            cmd_publish(&server, &file).await?;
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using the `DATABASE_*` variables.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    Ok(db)
}

async fn cmd_list_companies(db: &Database, limit: usize) -> Result<()> {
    let companies = db.company_repo().list(limit).await?;

    if companies.is_empty() {
        println!("No companies registered");
        return Ok(());
    }

    for company in &companies {
        println!(
            "  {:<24} {:<32} (created {})",
            company.company_id,
            company.company_name,
            company.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }

    println!("\nTotal: {} companies", companies.len());

    Ok(())
}

fn read_document(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read logistics object: {}", path.display()))?;
    serde_json::from_str(&raw).context("Invalid JSON in logistics object file")
}

async fn cmd_publish(server: &str, file: &Path) -> Result<()> {
    let document = read_document(file)?;
    let topic = type_of(&document)?;

    let client = SubscriberClient::new().context("Failed to create HTTP client")?;

    tracing::info!(%server, %topic, "Fetching subscription information");
    let subscription = client.fetch_subscription(server, topic).await?;

    tracing::info!(callback_url = %subscription.callback_url, "Delivering");
    let receipt = client.deliver(&subscription, &document).await?;

    if receipt.duplicate {
        println!("Already delivered: {} ({})", receipt.id, receipt.topic);
    } else {
        println!("Delivered: {} ({})", receipt.id, receipt.topic);
    }

    Ok(())
}
