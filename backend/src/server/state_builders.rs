//! Builders wiring adapters into HTTP state and embedded consumers.

use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use roster::domain::ports::{
    CommandQueue, CommandSource, OrganizationRepository, UniquenessIndex, UserRepository,
};
use roster::domain::{
    CommandConsumer, CommandProducerService, DirectDirectoryService, DirectoryQueryService,
    UniquenessClaims, UniquenessMode,
};
use roster::inbound::http::state::HttpState;
use roster::inbound::queue::spawn_channel_workers;
use roster::outbound::memory::{
    InMemoryCommandQueue, InMemoryDirectoryStore, InMemoryUniquenessIndex,
};
use roster::outbound::persistence::{
    DbPool, DieselOrganizationRepository, DieselUniquenessIndex, DieselUserRepository, migrate,
};
use roster::outbound::queue::PostgresCommandQueue;
use roster::settings::RosterSettings;

/// HTTP state plus the embedded consumer tasks feeding the same store.
pub(crate) struct Wiring {
    pub(crate) http_state: HttpState,
    pub(crate) consumers: Vec<JoinHandle<()>>,
}

/// Adapters chosen for one process.
struct Adapters<O, U, Q> {
    organizations: Arc<O>,
    users: Arc<U>,
    queue: Arc<Q>,
    source: Arc<dyn CommandSource>,
    index: Arc<dyn UniquenessIndex>,
}

/// Build adapters from settings: PostgreSQL when a database URL is set,
/// otherwise the in-memory set.
pub(crate) async fn build_wiring(
    settings: &RosterSettings,
    shutdown: &watch::Receiver<bool>,
) -> Result<Wiring> {
    let mode = settings.uniqueness_mode();

    match settings.pool_config() {
        Some(config) => {
            migrate(config.database_url())
                .await
                .wrap_err("failed to run schema migrations")?;
            let pool = DbPool::new(config)
                .await
                .wrap_err("failed to build database pool")?;
            info!(uniqueness_mode = %mode, "using PostgreSQL adapters");
            let queue = Arc::new(PostgresCommandQueue::new(
                pool.clone(),
                settings.queue_names(),
                settings.delivery_policy(),
            ));
            Ok(assemble(
                Adapters {
                    organizations: Arc::new(DieselOrganizationRepository::new(pool.clone())),
                    users: Arc::new(DieselUserRepository::new(pool.clone())),
                    source: queue.clone(),
                    queue,
                    index: Arc::new(DieselUniquenessIndex::new(pool)),
                },
                mode,
                settings,
                shutdown,
            ))
        }
        None => {
            info!(uniqueness_mode = %mode, "using in-memory adapters");
            let store = Arc::new(InMemoryDirectoryStore::new());
            let queue = Arc::new(InMemoryCommandQueue::new(
                Arc::new(mockable::DefaultClock),
                settings.delivery_policy(),
            ));
            Ok(assemble(
                Adapters {
                    organizations: Arc::clone(&store),
                    users: store,
                    source: queue.clone(),
                    queue,
                    index: Arc::new(InMemoryUniquenessIndex::default()),
                },
                mode,
                settings,
                shutdown,
            ))
        }
    }
}

fn assemble<O, U, Q>(
    adapters: Adapters<O, U, Q>,
    mode: UniquenessMode,
    settings: &RosterSettings,
    shutdown: &watch::Receiver<bool>,
) -> Wiring
where
    O: OrganizationRepository + 'static,
    U: UserRepository + 'static,
    Q: CommandQueue + 'static,
{
    let Adapters {
        organizations,
        users,
        queue,
        source,
        index,
    } = adapters;
    let claims = match mode {
        UniquenessMode::Advisory => UniquenessClaims::advisory(),
        UniquenessMode::Strict => UniquenessClaims::strict(index),
    };

    let http_state = HttpState::new(
        Arc::new(
            CommandProducerService::new(Arc::clone(&organizations), Arc::clone(&users), queue)
                .with_claims(claims.clone()),
        ),
        Arc::new(
            DirectDirectoryService::new(Arc::clone(&organizations), Arc::clone(&users))
                .with_claims(claims),
        ),
        Arc::new(DirectoryQueryService::new(
            Arc::clone(&organizations),
            Arc::clone(&users),
        )),
    );

    let consumers = if settings.consumer_enabled() {
        let consumer = CommandConsumer::new(organizations, users);
        spawn_channel_workers(&source, &consumer, settings.worker_settings(), shutdown)
    } else {
        info!("embedded consumer disabled");
        Vec::new()
    };

    Wiring {
        http_state,
        consumers,
    }
}
