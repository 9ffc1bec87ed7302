//! User aggregate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::OrganizationId;
use super::identifier::opaque_identifier;

opaque_identifier! {
    /// Stable user identifier (`userId` on the wire).
    UserId
}

/// Validation errors raised while building user components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// Name is missing or blank.
    #[error("user name must not be empty")]
    EmptyName,
    /// Email is missing or blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email is not shaped `local@domain`.
    #[error("email must look like local@domain")]
    MalformedEmail,
}

/// Human readable user name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address; unique among users at steady state.
///
/// Only the coarse `local@domain` shape is checked. Comparison is exact, so
/// `Bo@x.com` and `bo@x.com` are distinct addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    ///
    /// # Examples
    /// ```
    /// use roster::domain::EmailAddress;
    ///
    /// assert!(EmailAddress::new("bo@x.com").is_ok());
    /// assert!(EmailAddress::new("bo.x.com").is_err());
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let well_formed = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !well_formed {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// User record as stored and as carried by user commands.
///
/// ## Invariants
/// - `user_id` and `org_id` never change once assigned.
///
/// Serialises as `{"userId", "orgId", "name", "email"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId")]
    id: UserId,
    #[serde(rename = "orgId")]
    org_id: OrganizationId,
    name: UserName,
    email: EmailAddress,
}

impl User {
    /// Build a user from validated components.
    pub fn new(id: UserId, org_id: OrganizationId, name: UserName, email: EmailAddress) -> Self {
        Self {
            id,
            org_id,
            name,
            email,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Owning organization.
    pub fn org_id(&self) -> &OrganizationId {
        &self.org_id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("bo", UserValidationError::MalformedEmail)]
    #[case("@x.com", UserValidationError::MalformedEmail)]
    #[case("bo@", UserValidationError::MalformedEmail)]
    #[case("bo@x@y", UserValidationError::MalformedEmail)]
    #[case("b o@x.com", UserValidationError::MalformedEmail)]
    fn email_rejects_bad_shapes(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(EmailAddress::new(raw), Err(expected));
    }

    #[rstest]
    fn name_rejects_blank() {
        assert_eq!(UserName::new(" "), Err(UserValidationError::EmptyName));
    }

    #[rstest]
    fn serialises_with_wire_field_names() {
        let user = User::new(
            UserId::new("user-1").expect("id"),
            OrganizationId::new("org-1").expect("org id"),
            UserName::new("Bo").expect("name"),
            EmailAddress::new("bo@x.com").expect("email"),
        );
        let value = serde_json::to_value(&user).expect("serialise");
        assert_eq!(
            value,
            json!({ "userId": "user-1", "orgId": "org-1", "name": "Bo", "email": "bo@x.com" })
        );
    }
}
