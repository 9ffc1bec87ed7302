//! Shared in-memory wiring for integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;

use roster::domain::ports::CommandSource;
use roster::domain::{
    CommandChannel, CommandConsumer, CommandProducerService, DirectDirectoryService,
    DirectoryQueryService, UniquenessClaims,
};
use roster::inbound::http::state::HttpState;
use roster::inbound::queue::{CommandWorker, WorkerSettings, WorkerTick};
use roster::outbound::memory::{
    InMemoryCommandQueue, InMemoryDirectoryStore, InMemoryUniquenessIndex,
};

pub type Store = InMemoryDirectoryStore;
pub type Producer = CommandProducerService<Store, Store, InMemoryCommandQueue>;
pub type Direct = DirectDirectoryService<Store, Store>;
pub type Query = DirectoryQueryService<Store, Store>;

/// One directory: store, queue, and the services over them.
pub struct Directory {
    pub store: Arc<Store>,
    pub queue: Arc<InMemoryCommandQueue>,
    pub producer: Arc<Producer>,
    pub direct: Arc<Direct>,
    pub query: Arc<Query>,
}

impl Directory {
    pub fn advisory() -> Self {
        Self::with_claims(UniquenessClaims::advisory())
    }

    pub fn strict() -> Self {
        Self::with_claims(UniquenessClaims::strict(Arc::new(
            InMemoryUniquenessIndex::new(),
        )))
    }

    fn with_claims(claims: UniquenessClaims) -> Self {
        let store = Arc::new(Store::new());
        let queue = Arc::new(InMemoryCommandQueue::default());
        let producer = Arc::new(
            CommandProducerService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&queue),
            )
            .with_claims(claims.clone()),
        );
        let direct = Arc::new(
            DirectDirectoryService::new(Arc::clone(&store), Arc::clone(&store))
                .with_claims(claims),
        );
        let query = Arc::new(DirectoryQueryService::new(
            Arc::clone(&store),
            Arc::clone(&store),
        ));
        Self {
            store,
            queue,
            producer,
            direct,
            query,
        }
    }

    /// HTTP state over this directory's services.
    pub fn http_state(&self) -> HttpState {
        HttpState::new(
            self.producer.clone(),
            self.direct.clone(),
            self.query.clone(),
        )
    }

    /// Apply every visible message on both channels; returns ticks that
    /// handled at least one message.
    pub async fn drain(&self) -> Vec<WorkerTick> {
        let source: Arc<dyn CommandSource> = self.queue.clone();
        let consumer = CommandConsumer::new(Arc::clone(&self.store), Arc::clone(&self.store));
        let mut ticks = Vec::new();
        for channel in CommandChannel::ALL {
            let worker = CommandWorker::new(
                Arc::clone(&source),
                consumer.clone(),
                channel,
                WorkerSettings::default(),
            );
            loop {
                match worker.run_once().await.expect("receive from in-memory queue") {
                    WorkerTick::Idle => break,
                    tick => ticks.push(tick),
                }
            }
        }
        ticks
    }
}
