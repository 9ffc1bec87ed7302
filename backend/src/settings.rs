//! Runtime configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `ROSTER_*` environment variables, and
//! configuration files, in OrthoConfig's usual precedence. Unset knobs fall
//! back to the defaults exposed by the accessor methods.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::UniquenessMode;
use crate::inbound::queue::WorkerSettings;
use crate::outbound::persistence::PoolConfig;
use crate::outbound::queue::{DeliveryPolicy, QueueNames};

const DEFAULT_PORT: u16 = 8080;

/// Configuration shared by the server and the standalone consumer.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROSTER")]
pub struct RosterSettings {
    /// Socket the HTTP server listens on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. When absent the server runs on in-memory adapters.
    pub database_url: Option<String>,
    /// Destination for organization commands.
    pub organization_queue: Option<String>,
    /// Destination for user commands.
    pub user_queue: Option<String>,
    /// `advisory` or `strict`.
    pub uniqueness_mode: Option<UniquenessMode>,
    /// Run a consumer inside the server process.
    pub consumer_enabled: Option<bool>,
    pub consumer_batch_size: Option<usize>,
    pub consumer_poll_interval_ms: Option<u64>,
    pub visibility_timeout_secs: Option<u64>,
    pub max_receive_count: Option<u32>,
    pub db_max_connections: Option<u32>,
}

impl RosterSettings {
    /// Listening socket, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Queue destinations with the standard names filled in.
    pub fn queue_names(&self) -> QueueNames {
        let defaults = QueueNames::default();
        QueueNames::new(
            self.organization_queue
                .clone()
                .unwrap_or(defaults.organizations),
            self.user_queue.clone().unwrap_or(defaults.users),
        )
    }

    /// Uniqueness mode; advisory when unset.
    pub fn uniqueness_mode(&self) -> UniquenessMode {
        self.uniqueness_mode.unwrap_or_default()
    }

    /// Whether the server runs embedded consumers; on unless disabled.
    pub fn consumer_enabled(&self) -> bool {
        self.consumer_enabled.unwrap_or(true)
    }

    pub fn worker_settings(&self) -> WorkerSettings {
        let defaults = WorkerSettings::default();
        WorkerSettings {
            batch_size: self.consumer_batch_size.unwrap_or(defaults.batch_size).max(1),
            poll_interval: self
                .consumer_poll_interval_ms
                .map_or(defaults.poll_interval, Duration::from_millis),
        }
    }

    pub fn delivery_policy(&self) -> DeliveryPolicy {
        let defaults = DeliveryPolicy::default();
        DeliveryPolicy {
            visibility_timeout: self
                .visibility_timeout_secs
                .map_or(defaults.visibility_timeout, Duration::from_secs),
            max_receive_count: self
                .max_receive_count
                .unwrap_or(defaults.max_receive_count)
                .max(1),
        }
    }

    /// Pool configuration when a database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_deref().map(|url| {
            let config = PoolConfig::new(url);
            match self.db_max_connections {
                Some(max_size) => config.with_max_size(max_size.max(1)),
                None => config,
            }
        })
    }
}
