//! Read-through directory queries.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::directory_guard::map_store_error;
use crate::domain::ports::{DirectoryQuery, OrganizationRepository, UserRepository};
use crate::domain::{Error, Organization, OrganizationId, User};

/// Query service implementing [`DirectoryQuery`].
pub struct DirectoryQueryService<O, U> {
    organizations: Arc<O>,
    users: Arc<U>,
}

impl<O, U> DirectoryQueryService<O, U> {
    pub fn new(organizations: Arc<O>, users: Arc<U>) -> Self {
        Self {
            organizations,
            users,
        }
    }
}

#[async_trait]
impl<O, U> DirectoryQuery for DirectoryQueryService<O, U>
where
    O: OrganizationRepository,
    U: UserRepository,
{
    async fn list_organizations(&self) -> Result<Vec<Organization>, Error> {
        self.organizations.list().await.map_err(map_store_error)
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_store_error)
    }

    async fn list_organization_users(&self, org_id: &str) -> Result<Vec<User>, Error> {
        let org_id = OrganizationId::new(org_id)
            .map_err(|err| Error::invalid_request(format!("invalid orgId: {err}")))?;
        self.organizations
            .find_by_id(&org_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("organization {org_id} not found")))?;
        self.users
            .list_by_organization(&org_id)
            .await
            .map_err(map_store_error)
    }
}
