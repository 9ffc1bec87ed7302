//! Internal Diesel row structs.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain.

use diesel::prelude::*;

use super::schema::{organizations, uniqueness_claims, users};
use crate::domain::{
    EmailAddress, Organization, OrganizationId, OrganizationName, User, UserId, UserName,
};
use crate::domain::ports::StoreError;

/// Row struct for the organizations table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganizationRow {
    pub org_id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Organization> for OrganizationRow {
    fn from(value: &Organization) -> Self {
        Self {
            org_id: value.id().as_str().to_owned(),
            name: value.name().as_ref().to_owned(),
            description: value.description().map(str::to_owned),
        }
    }
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = StoreError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        let id = OrganizationId::new(row.org_id)
            .map_err(|err| StoreError::query(format!("invalid stored org_id: {err}")))?;
        let name = OrganizationName::new(row.name)
            .map_err(|err| StoreError::query(format!("invalid stored organization: {err}")))?;
        Ok(Organization::new(id, name, row.description))
    }
}

/// Row struct for the users table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub user_id: String,
    pub org_id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserRow {
    fn from(value: &User) -> Self {
        Self {
            user_id: value.id().as_str().to_owned(),
            org_id: value.org_id().as_str().to_owned(),
            name: value.name().as_ref().to_owned(),
            email: value.email().as_ref().to_owned(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |err: &dyn std::fmt::Display| {
            StoreError::query(format!("invalid stored user {}: {err}", row.user_id))
        };
        let id = UserId::new(row.user_id.as_str()).map_err(|err| invalid(&err))?;
        let org_id = OrganizationId::new(row.org_id.as_str()).map_err(|err| invalid(&err))?;
        let name = UserName::new(row.name.as_str()).map_err(|err| invalid(&err))?;
        let email = EmailAddress::new(row.email.as_str()).map_err(|err| invalid(&err))?;
        Ok(User::new(id, org_id, name, email))
    }
}

/// Insertable struct for uniqueness claims.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = uniqueness_claims)]
pub(crate) struct NewClaimRow<'a> {
    pub kind: &'a str,
    pub value: &'a str,
    pub owner_id: &'a str,
}
