//! In-process adapters.
//!
//! Used when no database is configured and by the integration tests. They
//! honour the same contracts as the PostgreSQL adapters: upserts are
//! last-writer-wins, scans return every match, and queue deliveries are
//! at-least-once with a visibility timeout.

mod queue;
mod store;
mod uniqueness;

pub use queue::InMemoryCommandQueue;
pub use store::InMemoryDirectoryStore;
pub use uniqueness::InMemoryUniquenessIndex;
