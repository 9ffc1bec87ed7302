//! Driven ports for the directory store.
//!
//! The store is a keyed table with secondary-index lookups. Writes are
//! unconditional upserts with last-writer-wins semantics; no port here
//! enforces name or email uniqueness.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Organization, OrganizationId, OrganizationName, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised by store adapters.
    pub enum StoreError {
        /// The store could not be reached.
        Connection { message: String } => "directory store connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } => "directory store query failed: {message}",
    }
}

/// Organization table access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Fetch an organization by identifier.
    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, StoreError>;

    /// Scan the name index. More than one row means the uniqueness invariant
    /// was broken by a race.
    async fn find_by_name(&self, name: &OrganizationName)
    -> Result<Vec<Organization>, StoreError>;

    /// Insert or overwrite the organization keyed by its identifier.
    async fn upsert(&self, organization: &Organization) -> Result<(), StoreError>;

    /// Enumerate every organization.
    async fn list(&self) -> Result<Vec<Organization>, StoreError>;
}

/// User table access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Scan the email index.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Vec<User>, StoreError>;

    /// Scan the organization index.
    async fn list_by_organization(&self, org_id: &OrganizationId)
    -> Result<Vec<User>, StoreError>;

    /// Insert or overwrite the user keyed by its identifier.
    async fn upsert(&self, user: &User) -> Result<(), StoreError>;

    /// Enumerate every user.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}
