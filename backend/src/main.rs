//! Roster entry-point: wires adapters, REST endpoints, and embedded consumers.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use roster::inbound::http::health::HealthState;
use roster::settings::RosterSettings;

use server::{ServerConfig, Wiring, build_wiring, create_server};

/// Application bootstrap.
#[actix_web::main]
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
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let Wiring {
        http_state,
        consumers,
    } = build_wiring(&settings, &shutdown_rx).await?;

    let bind_addr = settings.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), ServerConfig::new(bind_addr, http_state))
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, consumers = consumers.len(), "roster listening");

    let served = server.await;
    health_state.mark_unhealthy();
    shutdown_tx.send_replace(true);
    for consumer in consumers {
        if let Err(err) = consumer.await {
            warn!(error = %err, "command worker ended abnormally");
        }
    }
    served.wrap_err("HTTP server failed")
}
