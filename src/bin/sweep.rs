//! Reservation expiry sweep, invoked on a schedule by an external
//! cron-equivalent.
//!
//! Runs one complete pass and exits: connect, release every reservation
//! older than the configured timeout, log the summary.

use chrono::{Duration, Utc};
use raffle::{run_sweep, Config, PostgresTicketStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raffle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let timeout = Duration::minutes(config.raffle.reservation_timeout_minutes);
    info!(
        timeout_minutes = config.raffle.reservation_timeout_minutes,
        "Starting reservation expiry sweep"
    );

    let store = PostgresTicketStore::connect(
        &config.database.url,
        config.database.max_connections,
        std::time::Duration::from_secs(config.database.connect_timeout),
    )
    .await?;
    store.migrate().await?;

    let outcome = run_sweep(&store, timeout, Utc::now()).await?;
    if outcome.count() > 0 {
        info!(
            released = outcome.count(),
            tickets = ?outcome.released,
            "Released expired reservations"
        );
    } else {
        info!("No expired reservations found");
    }

    Ok(())
}
