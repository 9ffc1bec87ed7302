//! Standalone command consumer.
//!
//! Drains the organization and user command queues in PostgreSQL into the
//! directory tables until interrupted. Requires `ROSTER_DATABASE_URL`.

use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use roster::domain::CommandConsumer;
use roster::domain::ports::CommandSource;
use roster::inbound::queue::spawn_channel_workers;
use roster::outbound::persistence::{
    DbPool, DieselOrganizationRepository, DieselUserRepository, migrate,
};
use roster::outbound::queue::PostgresCommandQueue;
use roster::settings::RosterSettings;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = RosterSettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load configuration")?;
    let pool_config = settings
        .pool_config()
        .ok_or_else(|| eyre!("ROSTER_DATABASE_URL must be set for the standalone consumer"))?;
    migrate(pool_config.database_url())
        .await
        .wrap_err("failed to run schema migrations")?;
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to build database pool")?;

    let source: Arc<dyn CommandSource> = Arc::new(PostgresCommandQueue::new(
        pool.clone(),
        settings.queue_names(),
        settings.delivery_policy(),
    ));
    let consumer = CommandConsumer::new(
        Arc::new(DieselOrganizationRepository::new(pool.clone())),
        Arc::new(DieselUserRepository::new(pool)),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let workers = spawn_channel_workers(
        &source,
        &consumer,
        settings.worker_settings(),
        &shutdown_rx,
    );
    info!(workers = workers.len(), "command consumer running");

    tokio::signal::ctrl_c()
        .await
        .wrap_err("failed to listen for shutdown signal")?;
    info!("shutdown requested; draining workers");
    shutdown_tx.send_replace(true);
    for worker in workers {
        if let Err(err) = worker.await {
            warn!(error = %err, "command worker ended abnormally");
        }
    }
    Ok(())
}
