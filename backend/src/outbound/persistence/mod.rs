//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories are thin translators between Diesel rows (`models.rs`) and
//! domain types. Connections come from a shared `bb8` pool driven by
//! `diesel-async`. Every database failure maps onto
//! [`StoreError`](crate::domain::ports::StoreError).

mod diesel_directory_repository;
pub(crate) mod diesel_error_mapping;
mod diesel_uniqueness_index;
mod migrations;
mod models;
mod pool;
pub(crate) mod schema;

pub use diesel_directory_repository::{DieselOrganizationRepository, DieselUserRepository};
pub use diesel_uniqueness_index::DieselUniquenessIndex;
pub use migrations::{MIGRATIONS, migrate, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
