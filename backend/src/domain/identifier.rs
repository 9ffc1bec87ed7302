//! Opaque identifiers shared by the directory aggregates.
//!
//! Identifiers are generated as UUID v4 strings on create but are accepted as
//! arbitrary opaque strings on lookup, so a well-formed but unknown value is a
//! "not found" rather than a validation failure.

use thiserror::Error;

/// Validation errors raised when constructing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier is empty.
    #[error("identifier must not be empty")]
    Empty,
    /// Identifier carries leading or trailing whitespace.
    #[error("identifier must not contain surrounding whitespace")]
    SurroundingWhitespace,
}

pub(crate) fn validate_identifier(raw: &str) -> Result<(), IdentifierError> {
    if raw.trim().is_empty() {
        return Err(IdentifierError::Empty);
    }
    if raw.trim() != raw {
        return Err(IdentifierError::SurroundingWhitespace);
    }
    Ok(())
}

macro_rules! opaque_identifier {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap an existing identifier.
            pub fn new(
                id: impl Into<String>,
            ) -> Result<Self, $crate::domain::identifier::IdentifierError> {
                let raw = id.into();
                $crate::domain::identifier::validate_identifier(&raw)?;
                Ok(Self(raw))
            }

            /// Generate a fresh identifier.
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::identifier::IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

pub(crate) use opaque_identifier;
