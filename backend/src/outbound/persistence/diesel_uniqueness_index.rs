//! PostgreSQL-backed uniqueness claims for strict mode.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ClaimOutcome, StoreError, UniqueKey, UniquenessIndex};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewClaimRow;
use super::pool::DbPool;
use super::schema::uniqueness_claims;

/// Claims stored in `uniqueness_claims`, keyed by `(kind, value)`.
#[derive(Clone)]
pub struct DieselUniquenessIndex {
    pool: DbPool,
}

impl DieselUniquenessIndex {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UniquenessIndex for DieselUniquenessIndex {
    async fn claim(&self, key: &UniqueKey, owner: &str) -> Result<ClaimOutcome, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewClaimRow {
            kind: key.kind().as_str(),
            value: key.value(),
            owner_id: owner,
        };
        let inserted = diesel::insert_into(uniqueness_claims::table)
            .values(&row)
            .on_conflict((uniqueness_claims::kind, uniqueness_claims::value))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if inserted == 1 {
            return Ok(ClaimOutcome::Claimed);
        }

        let holder: Option<String> = uniqueness_claims::table
            .filter(uniqueness_claims::kind.eq(key.kind().as_str()))
            .filter(uniqueness_claims::value.eq(key.value()))
            .select(uniqueness_claims::owner_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match holder {
            Some(holder) if holder == owner => Ok(ClaimOutcome::Claimed),
            Some(holder) => Ok(ClaimOutcome::HeldBy(holder)),
            // Released between the insert and the read; the next attempt wins.
            None => Err(StoreError::query("uniqueness claim changed concurrently")),
        }
    }

    async fn release(&self, key: &UniqueKey, owner: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(
            uniqueness_claims::table
                .filter(uniqueness_claims::kind.eq(key.kind().as_str()))
                .filter(uniqueness_claims::value.eq(key.value()))
                .filter(uniqueness_claims::owner_id.eq(owner)),
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }
}
