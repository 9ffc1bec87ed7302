//! Driving ports for directory mutations and reads.
//!
//! Requests carry raw, unvalidated input exactly as a caller supplied it;
//! services own validation so every inbound adapter shares one rule set.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, Organization, OrganizationId, User, UserId};

/// Create an organization. `name` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOrganizationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Update an organization. Unsupplied or blank fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOrganizationRequest {
    pub org_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Create a user inside `org_id`. `name` and `email` are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub org_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Update a user owned by `org_id`. Unsupplied or blank fields keep the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserRequest {
    pub org_id: String,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Acknowledgement that an organization command was enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationAccepted {
    pub org_id: OrganizationId,
}

/// Acknowledgement that a user command was enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccepted {
    pub user_id: UserId,
}

/// Asynchronous mutations: validate, pre-check, enqueue, return.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueuedDirectoryCommand: Send + Sync {
    async fn create_organization(
        &self,
        request: CreateOrganizationRequest,
    ) -> Result<OrganizationAccepted, Error>;

    async fn update_organization(
        &self,
        request: UpdateOrganizationRequest,
    ) -> Result<OrganizationAccepted, Error>;

    async fn create_user(&self, request: CreateUserRequest) -> Result<UserAccepted, Error>;

    async fn update_user(&self, request: UpdateUserRequest) -> Result<UserAccepted, Error>;
}

/// Synchronous mutations: validate, pre-check, write, return the record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectDirectoryCommand: Send + Sync {
    async fn create_organization(
        &self,
        request: CreateOrganizationRequest,
    ) -> Result<Organization, Error>;

    async fn update_organization(
        &self,
        request: UpdateOrganizationRequest,
    ) -> Result<Organization, Error>;

    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error>;

    async fn update_user(&self, request: UpdateUserRequest) -> Result<User, Error>;
}

/// Read-through views of the store; never consult the queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryQuery: Send + Sync {
    async fn list_organizations(&self) -> Result<Vec<Organization>, Error>;

    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Users of one organization; not found when the organization is absent.
    async fn list_organization_users(&self, org_id: &str) -> Result<Vec<User>, Error>;
}
