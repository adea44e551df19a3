use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use social_api::config::{self, AppConfig};
use social_api::database::Database;
use social_api::{app, is_production, AppState};

#[derive(Parser)]
#[command(name = "social-api")]
#[command(about = "Social media REST backend")]
#[command(version)]
struct Args {
    /// Ignore DATABASE_URL and keep everything in process memory
    #[arg(long)]
    memory: bool,

    /// Override API_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")))
        .init();

    let args = Args::parse();

    let mut settings: AppConfig = config::config().clone();
    settings.validate().map_err(anyhow::Error::msg)?;
    if args.memory {
        settings.database.url.clear();
    }
    if is_production!() && settings.database.url.is_empty() {
        anyhow::bail!("DATABASE_URL is required in production");
    }
    let port = args.port.unwrap_or(settings.api.port);

    info!("Starting social-api in {:?} mode", settings.environment);

    let db = Database::connect(&settings.database)
        .await
        .context("failed to connect to the database")?;
    db.migrate().await.context("failed to apply migrations")?;

    let app = app(AppState::new(db.clone(), settings));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("social-api listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
