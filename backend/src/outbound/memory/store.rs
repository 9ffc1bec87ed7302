//! In-memory organization and user tables.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{OrganizationRepository, StoreError, UserRepository};
use crate::domain::{EmailAddress, Organization, OrganizationId, OrganizationName, User, UserId};

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::connection("in-memory store lock poisoned")
}

/// Both directory tables behind reader-writer locks.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    organizations: RwLock<HashMap<OrganizationId, Organization>>,
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted<K: Ord, V>(mut rows: Vec<(K, V)>) -> Vec<V> {
    rows.sort_by(|left, right| left.0.cmp(&right.0));
    rows.into_iter().map(|(_, value)| value).collect()
}

#[async_trait]
impl OrganizationRepository for InMemoryDirectoryStore {
    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, StoreError> {
        let table = self.organizations.read().map_err(poisoned)?;
        Ok(table.get(id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &OrganizationName,
    ) -> Result<Vec<Organization>, StoreError> {
        let table = self.organizations.read().map_err(poisoned)?;
        Ok(sorted(
            table
                .iter()
                .filter(|(_, org)| org.name() == name)
                .map(|(id, org)| (id.clone(), org.clone()))
                .collect(),
        ))
    }

    async fn upsert(&self, organization: &Organization) -> Result<(), StoreError> {
        let mut table = self.organizations.write().map_err(poisoned)?;
        table.insert(organization.id().clone(), organization.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Organization>, StoreError> {
        let table = self.organizations.read().map_err(poisoned)?;
        Ok(sorted(
            table
                .iter()
                .map(|(id, org)| (id.clone(), org.clone()))
                .collect(),
        ))
    }
}

#[async_trait]
impl UserRepository for InMemoryDirectoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let table = self.users.read().map_err(poisoned)?;
        Ok(table.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Vec<User>, StoreError> {
        let table = self.users.read().map_err(poisoned)?;
        Ok(sorted(
            table
                .iter()
                .filter(|(_, user)| user.email() == email)
                .map(|(id, user)| (id.clone(), user.clone()))
                .collect(),
        ))
    }

    async fn list_by_organization(
        &self,
        org_id: &OrganizationId,
    ) -> Result<Vec<User>, StoreError> {
        let table = self.users.read().map_err(poisoned)?;
        Ok(sorted(
            table
                .iter()
                .filter(|(_, user)| user.org_id() == org_id)
                .map(|(id, user)| (id.clone(), user.clone()))
                .collect(),
        ))
    }

    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        let mut table = self.users.write().map_err(poisoned)?;
        table.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let table = self.users.read().map_err(poisoned)?;
        Ok(sorted(
            table
                .iter()
                .map(|(id, user)| (id.clone(), user.clone()))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::directory::{organization, user};

    #[tokio::test]
    async fn upsert_overwrites_by_identifier() {
        let store = InMemoryDirectoryStore::new();
        OrganizationRepository::upsert(&store, &organization("org-1", "Acme", None))
            .await
            .expect("insert");
        OrganizationRepository::upsert(&store, &organization("org-1", "Acme", Some("Rockets")))
            .await
            .expect("overwrite");

        let all = OrganizationRepository::list(&store).await.expect("list");
        assert_eq!(all, vec![organization("org-1", "Acme", Some("Rockets"))]);
    }

    #[tokio::test]
    async fn name_scan_returns_every_holder() {
        let store = InMemoryDirectoryStore::new();
        for id in ["org-2", "org-1"] {
            OrganizationRepository::upsert(&store, &organization(id, "Acme", None))
                .await
                .expect("insert");
        }

        let holders = store
            .find_by_name(&OrganizationName::new("Acme").expect("name"))
            .await
            .expect("scan");
        let ids: Vec<_> = holders.iter().map(|org| org.id().as_str()).collect();
        assert_eq!(ids, ["org-1", "org-2"]);
    }

    #[tokio::test]
    async fn users_are_indexed_by_organization_and_email() {
        let store = InMemoryDirectoryStore::new();
        UserRepository::upsert(&store, &user("user-1", "org-1", "Bo", "bo@x.com"))
            .await
            .expect("insert");
        UserRepository::upsert(&store, &user("user-2", "org-2", "Al", "al@x.com"))
            .await
            .expect("insert");

        let members = store
            .list_by_organization(&OrganizationId::new("org-1").expect("id"))
            .await
            .expect("scan");
        assert_eq!(members, vec![user("user-1", "org-1", "Bo", "bo@x.com")]);

        let holders = store
            .find_by_email(&EmailAddress::new("al@x.com").expect("email"))
            .await
            .expect("scan");
        assert_eq!(holders.len(), 1);
    }
}
