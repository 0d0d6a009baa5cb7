use clap::Parser;
use error_common::{log_error, MedGateError, Result};
use logger_redacted::init_tracing;
use medgate_server::{create_app, AppConfig, MedGateServer};
use std::net::SocketAddr;
use tracing::info;

/// MedGate HTTP server
#[derive(Parser, Debug)]
#[command(name = "medgate-server")]
#[command(about = "Credential-gated signup and identity API for healthcare records")]
struct Args {
    /// Configuration file (YAML or TOML); missing files are ignored
    #[arg(short, long, env = "MEDGATE_CONFIG", default_value = "medgate.yaml")]
    config: String,

    /// Overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal outside development
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = AppConfig::load(Some(&args.config))
        .map_err(|e| MedGateError::ConfigError(e.to_string()))?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.verbose {
        config.logging.level = "debug".to_string();
    }

    init_tracing(&config.logging).map_err(|e| MedGateError::ConfigError(e.to_string()))?;

    if let Err(e) = run(config).await {
        log_error("medgate-server", &e);
        return Err(e);
    }
    Ok(())
}

async fn run(config: AppConfig) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting MedGate server");

    let server = MedGateServer::from_config(&config).await?;
    let app = create_app(server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| MedGateError::ConfigError(format!("invalid bind address: {}", e)))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MedGateError::NetworkError(format!("Failed to bind to {}: {}", addr, e)))?;

    info!(%addr, "MedGate API available at http://{}/api/v1", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MedGateError::ServerError(format!("HTTP server error: {}", e)))?;

    info!("MedGate server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
