//! Raffle service HTTP server.

use raffle::clock::SystemClock;
use raffle::server::{build_router, AppState};
use raffle::{Config, PostgresTicketStore, TicketLifecycle, TicketStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raffle=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting raffle HTTP server");

    // Load configuration
    let config = Config::from_env();
    info!(
        database_url = %config.database.url,
        ticket_count = config.raffle.ticket_count,
        timeout_minutes = config.raffle.reservation_timeout_minutes,
        "Configuration loaded"
    );

    // Connect to the ticket store and apply migrations
    info!("Connecting to database...");
    let store = PostgresTicketStore::connect(
        &config.database.url,
        config.database.max_connections,
        Duration::from_secs(config.database.connect_timeout),
    )
    .await?;
    store.migrate().await?;
    info!("Database connected and migrated");

    let store: Arc<dyn TicketStore> = Arc::new(store);
    let lifecycle = Arc::new(TicketLifecycle::new(store.clone(), Arc::new(SystemClock)));

    // Populate the ticket pool on first start; a no-op afterwards
    let created = lifecycle.bootstrap(config.raffle.ticket_count).await?;
    if created > 0 {
        info!(created, "Ticket pool created");
    }

    // Build router
    let state = AppState::new(store, lifecycle, Arc::new(config.clone()));
    let app = build_router(state);

    // Create server address
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
