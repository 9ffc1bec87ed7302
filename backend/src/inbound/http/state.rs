//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{DirectDirectoryCommand, DirectoryQuery, QueuedDirectoryCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Producer behind the `/queued` routes.
    pub queued: Arc<dyn QueuedDirectoryCommand>,
    /// Direct-write service behind the synchronous mutation routes.
    pub direct: Arc<dyn DirectDirectoryCommand>,
    pub query: Arc<dyn DirectoryQuery>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use roster::domain::{
    ///     CommandProducerService, DirectDirectoryService, DirectoryQueryService,
    /// };
    /// use roster::inbound::http::state::HttpState;
    /// use roster::outbound::memory::{InMemoryCommandQueue, InMemoryDirectoryStore};
    ///
    /// let store = Arc::new(InMemoryDirectoryStore::default());
    /// let queue = Arc::new(InMemoryCommandQueue::default());
    /// let state = HttpState::new(
    ///     Arc::new(CommandProducerService::new(
    ///         Arc::clone(&store),
    ///         Arc::clone(&store),
    ///         queue,
    ///     )),
    ///     Arc::new(DirectDirectoryService::new(Arc::clone(&store), Arc::clone(&store))),
    ///     Arc::new(DirectoryQueryService::new(Arc::clone(&store), store)),
    /// );
    /// let _ = state.query.clone();
    /// ```
    pub fn new(
        queued: Arc<dyn QueuedDirectoryCommand>,
        direct: Arc<dyn DirectDirectoryCommand>,
        query: Arc<dyn DirectoryQuery>,
    ) -> Self {
        Self {
            queued,
            direct,
            query,
        }
    }
}
