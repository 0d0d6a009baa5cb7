//! Credential registry seeding tool
//!
//! Applies a YAML or JSON seed file to the Postgres credential registry.
//!
//! Usage:
//!   seed_registry --database-url postgres://... --file seeds/dev.yaml [--dry-run]

use anyhow::Context;
use clap::Parser;
use credential_registry::{PostgresCredentialRegistry, RegistrySeed};
use database_layer::{mask_url, DatabasePool};
use logger_redacted::{init_tracing, LoggerConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "seed_registry")]
#[command(about = "Load doctor and organization records into the credential registry")]
struct Args {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Seed file (.yaml, .yml or .json)
    #[arg(long, short)]
    file: PathBuf,

    /// Do not apply pending schema migrations before seeding
    #[arg(long)]
    skip_migrations: bool,

    /// Parse and validate the file without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&LoggerConfig::default())?;

    let args = Args::parse();

    let seed = RegistrySeed::from_path(&args.file)
        .await
        .with_context(|| format!("failed to load seed file {}", args.file.display()))?;
    let summary = seed.summary();
    info!(
        file = %args.file.display(),
        doctors = summary.doctors,
        organizations = summary.organizations,
        employees = summary.employees,
        "Seed file loaded"
    );

    if args.dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    info!(database = %mask_url(&args.database_url), "Connecting");
    let pool = DatabasePool::new(&args.database_url).await?;
    if !args.skip_migrations {
        pool.run_migrations().await?;
    }

    let registry = PostgresCredentialRegistry::new(pool.pool().clone());
    seed.apply(&registry).await?;

    pool.close().await;
    info!("Registry seeding complete");
    Ok(())
}
