//! In-memory uniqueness claims.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{ClaimOutcome, StoreError, UniqueKey, UniquenessIndex};

/// Claims held in a mutex-guarded map; claim is atomic under the lock.
#[derive(Debug, Default)]
pub struct InMemoryUniquenessIndex {
    claims: Mutex<HashMap<UniqueKey, String>>,
}

impl InMemoryUniquenessIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UniquenessIndex for InMemoryUniquenessIndex {
    async fn claim(&self, key: &UniqueKey, owner: &str) -> Result<ClaimOutcome, StoreError> {
        let mut claims = self
            .claims
            .lock()
            .map_err(|_| StoreError::connection("uniqueness index lock poisoned"))?;
        let holder = claims
            .entry(key.clone())
            .or_insert_with(|| owner.to_owned());
        if holder == owner {
            Ok(ClaimOutcome::Claimed)
        } else {
            Ok(ClaimOutcome::HeldBy(holder.clone()))
        }
    }

    async fn release(&self, key: &UniqueKey, owner: &str) -> Result<(), StoreError> {
        let mut claims = self
            .claims
            .lock()
            .map_err(|_| StoreError::connection("uniqueness index lock poisoned"))?;
        if claims.get(key).is_some_and(|holder| holder == owner) {
            claims.remove(key);
        }
        Ok(())
    }
}
