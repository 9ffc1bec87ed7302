//! Organization aggregate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::identifier::opaque_identifier;

opaque_identifier! {
    /// Stable organization identifier (`orgId` on the wire).
    OrganizationId
}

/// Validation errors raised while building organization components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrganizationValidationError {
    /// Name is missing or blank.
    #[error("organization name must not be empty")]
    EmptyName,
}

/// Organization name; unique among organizations at steady state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrganizationName(String);

impl OrganizationName {
    /// Validate and construct an [`OrganizationName`].
    ///
    /// # Examples
    /// ```
    /// use roster::domain::OrganizationName;
    ///
    /// let name = OrganizationName::new("Acme").expect("valid name");
    /// assert_eq!(name.as_ref(), "Acme");
    /// assert!(OrganizationName::new("  ").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, OrganizationValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(OrganizationValidationError::EmptyName);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for OrganizationName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OrganizationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<OrganizationName> for String {
    fn from(value: OrganizationName) -> Self {
        value.0
    }
}

impl TryFrom<String> for OrganizationName {
    type Error = OrganizationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Organization record as stored and as carried by organization commands.
///
/// ## Invariants
/// - `org_id` never changes once assigned.
/// - `name` is non-blank.
///
/// Serialises as `{"orgId", "name", "description"}`; `description` is omitted
/// when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(rename = "orgId")]
    id: OrganizationId,
    name: OrganizationName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Organization {
    /// Build an organization from validated components.
    pub fn new(id: OrganizationId, name: OrganizationName, description: Option<String>) -> Self {
        Self {
            id,
            name,
            description,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &OrganizationId {
        &self.id
    }

    /// Current name.
    pub fn name(&self) -> &OrganizationName {
        &self.name
    }

    /// Optional free-text description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
