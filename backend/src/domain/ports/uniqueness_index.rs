//! Driven port for strict-mode uniqueness claims.

use async_trait::async_trait;

use crate::domain::{EmailAddress, OrganizationName};

use super::StoreError;

/// Unique attribute a claim reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueKind {
    /// Organization names.
    OrganizationName,
    /// User email addresses.
    UserEmail,
}

impl UniqueKind {
    /// Stable storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrganizationName => "organization_name",
            Self::UserEmail => "user_email",
        }
    }
}

/// A value within one unique attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    kind: UniqueKind,
    value: String,
}

impl UniqueKey {
    /// Key for an organization name.
    pub fn organization_name(name: &OrganizationName) -> Self {
        Self {
            kind: UniqueKind::OrganizationName,
            value: name.as_ref().to_owned(),
        }
    }

    /// Key for a user email.
    pub fn user_email(email: &EmailAddress) -> Self {
        Self {
            kind: UniqueKind::UserEmail,
            value: email.as_ref().to_owned(),
        }
    }

    /// Attribute kind.
    pub fn kind(&self) -> UniqueKind {
        self.kind
    }

    /// Claimed value.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// Result of a claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The caller now holds the key (or already did).
    Claimed,
    /// Another owner holds the key.
    HeldBy(String),
}

/// Atomic insert-if-absent index over unique values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniquenessIndex: Send + Sync {
    /// Reserve `key` for `owner`. Re-claiming by the current owner succeeds.
    async fn claim(&self, key: &UniqueKey, owner: &str) -> Result<ClaimOutcome, StoreError>;

    /// Drop the claim if `owner` holds it; otherwise a no-op.
    async fn release(&self, key: &UniqueKey, owner: &str) -> Result<(), StoreError>;
}
