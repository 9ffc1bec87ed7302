//! Schema migrations embedded from `backend/migrations`.
//!
//! Diesel's migration harness needs a synchronous connection, so start-up
//! opens a dedicated `PgConnection` on the blocking pool rather than
//! borrowing one from the async pool.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::StoreError;

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations and return the versions that ran.
pub fn run_migrations(database_url: &str) -> Result<Vec<String>, StoreError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| StoreError::connection(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| StoreError::query(format!("migration: {err}")))?;
    Ok(applied.iter().map(ToString::to_string).collect())
}

/// [`run_migrations`] on the blocking thread pool.
pub async fn migrate(database_url: &str) -> Result<(), StoreError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_migrations(&url))
        .await
        .map_err(|err| StoreError::query(format!("migration task failed: {err}")))??;
    info!(applied = ?applied, "schema migrations up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::migration::MigrationSource;
    use diesel::pg::Pg;

    #[test]
    fn directory_tables_ship_as_one_migration() {
        let migrations = MigrationSource::<Pg>::migrations(&MIGRATIONS).expect("embedded");
        let names: Vec<String> = migrations
            .iter()
            .map(|migration| migration.name().to_string())
            .collect();

        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with("create_directory"), "unexpected {names:?}");
    }

    #[test]
    fn unreachable_databases_are_connection_errors() {
        let err = run_migrations("postgres://roster@127.0.0.1:1/roster")
            .expect_err("nothing listens on port 1");

        assert!(matches!(err, StoreError::Connection { .. }));
    }
}
