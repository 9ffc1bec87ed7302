//! PostgreSQL-backed organization and user repositories.
//!
//! Writes are `INSERT ... ON CONFLICT (pk) DO UPDATE` upserts so a replayed
//! command overwrites the row with the same snapshot.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OrganizationRepository, StoreError, UserRepository};
use crate::domain::{EmailAddress, Organization, OrganizationId, OrganizationName, User, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{OrganizationRow, UserRow};
use super::pool::DbPool;
use super::schema::{organizations, users};

fn into_organizations(rows: Vec<OrganizationRow>) -> Result<Vec<Organization>, StoreError> {
    rows.into_iter().map(Organization::try_from).collect()
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, StoreError> {
    rows.into_iter().map(User::try_from).collect()
}

/// Diesel implementation of [`OrganizationRepository`].
#[derive(Clone)]
pub struct DieselOrganizationRepository {
    pool: DbPool,
}

impl DieselOrganizationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationRepository for DieselOrganizationRepository {
    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrganizationRow> = organizations::table
            .filter(organizations::org_id.eq(id.as_str()))
            .select(OrganizationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Organization::try_from).transpose()
    }

    async fn find_by_name(
        &self,
        name: &OrganizationName,
    ) -> Result<Vec<Organization>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrganizationRow> = organizations::table
            .filter(organizations::name.eq(name.as_ref()))
            .select(OrganizationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_organizations(rows)
    }

    async fn upsert(&self, organization: &Organization) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = OrganizationRow::from(organization);
        diesel::insert_into(organizations::table)
            .values(&row)
            .on_conflict(organizations::org_id)
            .do_update()
            .set((
                organizations::name.eq(excluded(organizations::name)),
                organizations::description.eq(excluded(organizations::description)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self) -> Result<Vec<Organization>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrganizationRow> = organizations::table
            .order(organizations::org_id.asc())
            .select(OrganizationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_organizations(rows)
    }
}

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::user_id.eq(id.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Vec<User>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_users(rows)
    }

    async fn list_by_organization(
        &self,
        org_id: &OrganizationId,
    ) -> Result<Vec<User>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::org_id.eq(org_id.as_str()))
            .order(users::user_id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_users(rows)
    }

    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UserRow::from(user);
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::user_id)
            .do_update()
            .set((
                users::org_id.eq(excluded(users::org_id)),
                users::name.eq(excluded(users::name)),
                users::email.eq(excluded(users::email)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::user_id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_users(rows)
    }
}
