//! Shared validation and invariant pre-checks for directory mutations.
//!
//! Both the queued and the direct services run every request through
//! [`DirectoryGuard`] before writing anything. Checks read the store as it is
//! now; nothing here holds a lock across the later write, so two concurrent
//! requests may both pass.

use std::sync::Arc;

use tracing::error;

use crate::domain::ports::{
    CreateOrganizationRequest, CreateUserRequest, OrganizationRepository, StoreError,
    UpdateOrganizationRequest, UpdateUserRequest, UserRepository,
};
use crate::domain::{
    EmailAddress, Error, Organization, OrganizationId, OrganizationName, User, UserId, UserName,
    UserValidationError,
};

/// Record state before and after a vetted update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<T> {
    pub previous: T,
    pub next: T,
}

/// Translate a store failure into an internal error, logging the cause.
pub(crate) fn map_store_error(err: StoreError) -> Error {
    error!(error = %err, "directory store failure");
    Error::internal(format!("directory store error: {err}"))
}

/// Treat absent and blank input the same way.
fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, Error> {
    supplied(value).ok_or_else(|| Error::missing_field(field))
}

fn parse_email(raw: String) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| match err {
        UserValidationError::EmptyEmail => Error::missing_field("email"),
        other => Error::invalid_request(other.to_string()),
    })
}

/// Pre-write checks over the organization and user repositories.
pub struct DirectoryGuard<O, U> {
    organizations: Arc<O>,
    users: Arc<U>,
}

impl<O, U> Clone for DirectoryGuard<O, U> {
    fn clone(&self) -> Self {
        Self {
            organizations: Arc::clone(&self.organizations),
            users: Arc::clone(&self.users),
        }
    }
}

impl<O, U> DirectoryGuard<O, U>
where
    O: OrganizationRepository,
    U: UserRepository,
{
    pub fn new(organizations: Arc<O>, users: Arc<U>) -> Self {
        Self {
            organizations,
            users,
        }
    }

    /// Validate a create request and mint the new organization.
    pub async fn vet_new_organization(
        &self,
        request: CreateOrganizationRequest,
    ) -> Result<Organization, Error> {
        let name = required(request.name, "name")?;
        let name =
            OrganizationName::new(name).map_err(|err| Error::invalid_request(err.to_string()))?;
        self.ensure_name_free(&name, None).await?;
        Ok(Organization::new(
            OrganizationId::random(),
            name,
            supplied(request.description),
        ))
    }

    /// Validate an update request and resolve the final organization state.
    pub async fn vet_organization_update(
        &self,
        request: UpdateOrganizationRequest,
    ) -> Result<Change<Organization>, Error> {
        let raw_id = required(request.org_id, "orgId")?;
        let id = OrganizationId::new(raw_id.as_str())
            .map_err(|err| Error::invalid_request(format!("invalid orgId: {err}")))?;
        let name = supplied(request.name)
            .map(OrganizationName::new)
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let previous = self.load_organization(&id).await?;
        let name = match name {
            Some(name) if name != *previous.name() => {
                self.ensure_name_free(&name, Some(&id)).await?;
                name
            }
            _ => previous.name().clone(),
        };
        let description = supplied(request.description)
            .or_else(|| previous.description().map(str::to_owned));
        let next = Organization::new(id, name, description);
        Ok(Change { previous, next })
    }

    /// Validate a create request and mint the new user.
    pub async fn vet_new_user(&self, request: CreateUserRequest) -> Result<User, Error> {
        let name = required(request.name, "name")?;
        let email = parse_email(required(request.email, "email")?)?;
        let name = UserName::new(name).map_err(|err| Error::invalid_request(err.to_string()))?;
        let org_id = OrganizationId::new(request.org_id)
            .map_err(|err| Error::invalid_request(format!("invalid orgId: {err}")))?;

        self.load_organization(&org_id).await?;
        self.ensure_email_free(&email, None).await?;
        Ok(User::new(UserId::random(), org_id, name, email))
    }

    /// Validate an update request and resolve the final user state.
    ///
    /// The stored `orgId` is always carried forward; a caller naming a
    /// different organization is rejected rather than moved.
    pub async fn vet_user_update(&self, request: UpdateUserRequest) -> Result<Change<User>, Error> {
        let raw_id = required(request.user_id, "userId")?;
        let id = UserId::new(raw_id.as_str())
            .map_err(|err| Error::invalid_request(format!("invalid userId: {err}")))?;
        let name = supplied(request.name)
            .map(UserName::new)
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let email = supplied(request.email).map(parse_email).transpose()?;

        let previous = self
            .users
            .find_by_id(&id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
        if previous.org_id().as_str() != request.org_id {
            return Err(Error::conflict(format!(
                "user {id} does not belong to organization {}",
                request.org_id
            )));
        }

        let email = match email {
            Some(email) if email != *previous.email() => {
                self.ensure_email_free(&email, Some(&id)).await?;
                email
            }
            _ => previous.email().clone(),
        };
        let name = name.unwrap_or_else(|| previous.name().clone());
        let next = User::new(id, previous.org_id().clone(), name, email);
        Ok(Change { previous, next })
    }

    async fn load_organization(&self, id: &OrganizationId) -> Result<Organization, Error> {
        self.organizations
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("organization {id} not found")))
    }

    async fn ensure_name_free(
        &self,
        name: &OrganizationName,
        owner: Option<&OrganizationId>,
    ) -> Result<(), Error> {
        let holders = self
            .organizations
            .find_by_name(name)
            .await
            .map_err(map_store_error)?;
        if holders.iter().any(|org| Some(org.id()) != owner) {
            return Err(Error::conflict(format!(
                "organization name {name} is already in use"
            )));
        }
        Ok(())
    }

    async fn ensure_email_free(
        &self,
        email: &EmailAddress,
        owner: Option<&UserId>,
    ) -> Result<(), Error> {
        let holders = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_store_error)?;
        if holders.iter().any(|user| Some(user.id()) != owner) {
            return Err(Error::conflict(format!("email {email} is already in use")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "directory_guard_tests.rs"]
mod tests;
