use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use crate::config::{self, AppConfig};
use crate::database::{
    DatabaseManager, MemoryRegistrationStore, PgRegistrationStore, RegistrationStore,
};
use crate::{routes, telemetry, AppState};

#[derive(Parser)]
#[command(name = "workforce-registry")]
#[command(about = "Worker trade and training registrations with validity alerts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(ServeArgs),

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Listen port (overrides REGISTRY_API_PORT / PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Serve from an in-memory store instead of PostgreSQL")]
    pub in_memory: bool,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::config().clone();
    telemetry::init(&config.telemetry)?;

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            if let Some(host) = args.host.clone() {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            serve(config, args.in_memory).await
        }
        Commands::Migrate => migrate(&config).await,
    }
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    info!("migrations applied");
    DatabaseManager::close(pool).await;
    Ok(())
}

async fn serve(config: AppConfig, in_memory: bool) -> anyhow::Result<()> {
    info!("Starting Workforce Registry API in {:?} mode", config.environment);

    if crate::is_production!() && config.api.expose_error_details {
        warn!("API_EXPOSE_ERROR_DETAILS is on in production; driver errors will reach clients");
    }

    let pool = if in_memory {
        warn!("using in-memory store; data is lost on shutdown");
        None
    } else {
        let pool = DatabaseManager::connect(&config.database).await?;
        if config.database.run_migrations {
            DatabaseManager::migrate(&pool).await?;
        }
        Some(pool)
    };

    let store: Arc<dyn RegistrationStore> = match &pool {
        Some(pool) => Arc::new(PgRegistrationStore::new(pool.clone())),
        None => Arc::new(MemoryRegistrationStore::new()),
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = routes::app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("listening on http://{}", bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(pool) = pool {
        DatabaseManager::close(pool).await;
    }
    served.context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
