//! Synchronous directory commands.
//!
//! Runs the same checks as the queued producer, then writes straight to the
//! store and returns the stored record.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::directory_guard::map_store_error;
use crate::domain::ports::{
    CreateOrganizationRequest, CreateUserRequest, DirectDirectoryCommand, OrganizationRepository,
    UniqueKey, UpdateOrganizationRequest, UpdateUserRequest, UserRepository,
};
use crate::domain::{DirectoryGuard, Error, Organization, UniquenessClaims, User};

/// Direct-write service implementing [`DirectDirectoryCommand`].
pub struct DirectDirectoryService<O, U> {
    guard: DirectoryGuard<O, U>,
    organizations: Arc<O>,
    users: Arc<U>,
    claims: UniquenessClaims,
}

impl<O, U> DirectDirectoryService<O, U>
where
    O: OrganizationRepository,
    U: UserRepository,
{
    pub fn new(organizations: Arc<O>, users: Arc<U>) -> Self {
        Self {
            guard: DirectoryGuard::new(Arc::clone(&organizations), Arc::clone(&users)),
            organizations,
            users,
            claims: UniquenessClaims::advisory(),
        }
    }

    /// Replace the uniqueness claims handle.
    pub fn with_claims(mut self, claims: UniquenessClaims) -> Self {
        self.claims = claims;
        self
    }

    async fn store_organization(
        &self,
        org: &Organization,
        claim: Option<UniqueKey>,
    ) -> Result<(), Error> {
        let owner = org.id().as_str();
        if let Some(key) = &claim {
            self.claims.reserve(key, owner).await?;
        }
        if let Err(err) = self.organizations.upsert(org).await {
            if let Some(key) = &claim {
                self.claims.release(key, owner).await;
            }
            return Err(map_store_error(err));
        }
        Ok(())
    }

    async fn store_user(&self, user: &User, claim: Option<UniqueKey>) -> Result<(), Error> {
        let owner = user.id().as_str();
        if let Some(key) = &claim {
            self.claims.reserve(key, owner).await?;
        }
        if let Err(err) = self.users.upsert(user).await {
            if let Some(key) = &claim {
                self.claims.release(key, owner).await;
            }
            return Err(map_store_error(err));
        }
        Ok(())
    }
}

#[async_trait]
impl<O, U> DirectDirectoryCommand for DirectDirectoryService<O, U>
where
    O: OrganizationRepository,
    U: UserRepository,
{
    async fn create_organization(
        &self,
        request: CreateOrganizationRequest,
    ) -> Result<Organization, Error> {
        let org = self.guard.vet_new_organization(request).await?;
        self.store_organization(&org, Some(UniqueKey::organization_name(org.name())))
            .await?;
        info!(org_id = %org.id(), "organization created");
        Ok(org)
    }

    async fn update_organization(
        &self,
        request: UpdateOrganizationRequest,
    ) -> Result<Organization, Error> {
        let change = self.guard.vet_organization_update(request).await?;
        let renamed = change.next.name() != change.previous.name();
        let claim = renamed.then(|| UniqueKey::organization_name(change.next.name()));
        self.store_organization(&change.next, claim).await?;
        if renamed {
            self.claims
                .release(
                    &UniqueKey::organization_name(change.previous.name()),
                    change.next.id().as_str(),
                )
                .await;
        }
        info!(org_id = %change.next.id(), "organization updated");
        Ok(change.next)
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error> {
        let user = self.guard.vet_new_user(request).await?;
        self.store_user(&user, Some(UniqueKey::user_email(user.email())))
            .await?;
        info!(user_id = %user.id(), org_id = %user.org_id(), "user created");
        Ok(user)
    }

    async fn update_user(&self, request: UpdateUserRequest) -> Result<User, Error> {
        let change = self.guard.vet_user_update(request).await?;
        let readdressed = change.next.email() != change.previous.email();
        let claim = readdressed.then(|| UniqueKey::user_email(change.next.email()));
        self.store_user(&change.next, claim).await?;
        if readdressed {
            self.claims
                .release(
                    &UniqueKey::user_email(change.previous.email()),
                    change.next.id().as_str(),
                )
                .await;
        }
        info!(user_id = %change.next.id(), "user updated");
        Ok(change.next)
    }
}
