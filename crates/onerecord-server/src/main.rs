use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use onerecord_db::{Database, DatabaseConfig};
use onerecord_server::config::ServerConfig;
use onerecord_server::routes;
use onerecord_server::startup::{check_database, log_database_check};
use onerecord_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("onerecord=info".parse()?))
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    let addr = format!("0.0.0.0:{}", config.port);

    // The pool connects on first use, so an unreachable database never blocks startup.
    let db = Database::connect_lazy(&DatabaseConfig::from_env()?)?;
    spawn_database_check(db.clone());

    tracing::info!(
        environment = %config.environment,
        public_url = %config.public_url,
        "Configuration loaded"
    );

    let state = Arc::new(AppState::new(db, config));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn spawn_database_check(db: Database) {
    tokio::spawn(async move {
        log_database_check(&check_database(&db).await);
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
