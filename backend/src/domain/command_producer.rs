//! Queued directory command service.
//!
//! Validates a request, pre-checks it against the current store state, and
//! enqueues one full-snapshot [`Command`]. Callers get an acceptance as soon
//! as the queue confirms the send; persistence happens later in the consumer.
//!
//! The service never retries. A send that fails after the queue has durably
//! stored the message still surfaces as an internal error, so a caller retry
//! may produce a duplicate command.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::domain::ports::{
    CommandQueue, CreateOrganizationRequest, CreateUserRequest, EnqueueError,
    OrganizationAccepted, OrganizationRepository, QueuedDirectoryCommand, UniqueKey,
    UpdateOrganizationRequest, UpdateUserRequest, UserAccepted, UserRepository,
};
use crate::domain::{Command, DirectoryGuard, Error, UniquenessClaims};

fn map_enqueue_error(err: EnqueueError) -> Error {
    error!(error = %err, "failed to enqueue directory command");
    Error::internal(format!("command queue error: {err}"))
}

/// Producer implementing [`QueuedDirectoryCommand`].
pub struct CommandProducerService<O, U, Q> {
    guard: DirectoryGuard<O, U>,
    queue: Arc<Q>,
    claims: UniquenessClaims,
}

impl<O, U, Q> CommandProducerService<O, U, Q>
where
    O: OrganizationRepository,
    U: UserRepository,
    Q: CommandQueue,
{
    /// Create an advisory-mode producer.
    pub fn new(organizations: Arc<O>, users: Arc<U>, queue: Arc<Q>) -> Self {
        Self {
            guard: DirectoryGuard::new(organizations, users),
            queue,
            claims: UniquenessClaims::advisory(),
        }
    }

    /// Replace the uniqueness claims handle.
    pub fn with_claims(mut self, claims: UniquenessClaims) -> Self {
        self.claims = claims;
        self
    }

    async fn dispatch(&self, command: &Command) -> Result<(), Error> {
        self.queue
            .enqueue(command)
            .await
            .map_err(map_enqueue_error)?;
        info!(
            command = command.kind(),
            channel = %command.channel(),
            target = %command.target(),
            "directory command enqueued"
        );
        Ok(())
    }

    /// Reserve `key`, enqueue, and give the reservation back on failure.
    async fn dispatch_claimed(
        &self,
        command: &Command,
        key: Option<(UniqueKey, &str)>,
    ) -> Result<(), Error> {
        if let Some((key, owner)) = &key {
            self.claims.reserve(key, owner).await?;
        }
        let result = self.dispatch(command).await;
        if result.is_err() {
            if let Some((key, owner)) = &key {
                self.claims.release(key, owner).await;
            }
        }
        result
    }
}

#[async_trait]
impl<O, U, Q> QueuedDirectoryCommand for CommandProducerService<O, U, Q>
where
    O: OrganizationRepository,
    U: UserRepository,
    Q: CommandQueue,
{
    async fn create_organization(
        &self,
        request: CreateOrganizationRequest,
    ) -> Result<OrganizationAccepted, Error> {
        let org = self.guard.vet_new_organization(request).await?;
        let key = UniqueKey::organization_name(org.name());
        let org_id = org.id().clone();
        self.dispatch_claimed(
            &Command::CreateOrganization(org),
            Some((key, org_id.as_str())),
        )
        .await?;
        Ok(OrganizationAccepted { org_id })
    }

    async fn update_organization(
        &self,
        request: UpdateOrganizationRequest,
    ) -> Result<OrganizationAccepted, Error> {
        let change = self.guard.vet_organization_update(request).await?;
        let org_id = change.next.id().clone();
        let renamed = change.next.name() != change.previous.name();
        let claim = renamed.then(|| {
            (
                UniqueKey::organization_name(change.next.name()),
                org_id.as_str(),
            )
        });
        self.dispatch_claimed(&Command::UpdateOrganization(change.next.clone()), claim)
            .await?;
        if renamed {
            self.claims
                .release(
                    &UniqueKey::organization_name(change.previous.name()),
                    org_id.as_str(),
                )
                .await;
        }
        Ok(OrganizationAccepted { org_id })
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<UserAccepted, Error> {
        let user = self.guard.vet_new_user(request).await?;
        let key = UniqueKey::user_email(user.email());
        let user_id = user.id().clone();
        self.dispatch_claimed(&Command::CreateUser(user), Some((key, user_id.as_str())))
            .await?;
        Ok(UserAccepted { user_id })
    }

    async fn update_user(&self, request: UpdateUserRequest) -> Result<UserAccepted, Error> {
        let change = self.guard.vet_user_update(request).await?;
        let user_id = change.next.id().clone();
        let readdressed = change.next.email() != change.previous.email();
        let claim = readdressed.then(|| {
            (
                UniqueKey::user_email(change.next.email()),
                user_id.as_str(),
            )
        });
        self.dispatch_claimed(&Command::UpdateUser(change.next.clone()), claim)
            .await?;
        if readdressed {
            self.claims
                .release(
                    &UniqueKey::user_email(change.previous.email()),
                    user_id.as_str(),
                )
                .await;
        }
        Ok(UserAccepted { user_id })
    }
}

#[cfg(test)]
#[path = "command_producer_tests.rs"]
mod tests;
