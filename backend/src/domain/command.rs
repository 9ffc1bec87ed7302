//! Directory change commands carried by the queue.
//!
//! A command is a full target-state snapshot of one organization or user,
//! never a delta. Applying it is an unconditional upsert keyed by the
//! entity identifier, so duplicate delivery converges on the same record and
//! out-of-order delivery can at worst restore an older snapshot.
//!
//! Wire shape: `{"type": "CREATE_ORG" | "UPDATE_ORG" | "CREATE_USER" |
//! "UPDATE_USER", ...entity fields}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{Organization, OrganizationId, User, UserId};

const CREATE_ORG: &str = "CREATE_ORG";
const UPDATE_ORG: &str = "UPDATE_ORG";
const CREATE_USER: &str = "CREATE_USER";
const UPDATE_USER: &str = "UPDATE_USER";

/// Command tags understood by the consumer.
pub const KNOWN_COMMAND_TYPES: [&str; 4] = [CREATE_ORG, UPDATE_ORG, CREATE_USER, UPDATE_USER];

/// Immutable change command.
///
/// # Examples
/// ```
/// use roster::domain::{Command, Organization, OrganizationId, OrganizationName};
///
/// let org = Organization::new(
///     OrganizationId::new("org-1").expect("id"),
///     OrganizationName::new("Acme").expect("name"),
///     None,
/// );
/// let message = Command::CreateOrganization(org).to_message().expect("encode");
/// assert_eq!(message, r#"{"type":"CREATE_ORG","orgId":"org-1","name":"Acme"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Materialise a newly created organization.
    #[serde(rename = "CREATE_ORG")]
    CreateOrganization(Organization),
    /// Overwrite an organization with its resolved final state.
    #[serde(rename = "UPDATE_ORG")]
    UpdateOrganization(Organization),
    /// Materialise a newly created user.
    #[serde(rename = "CREATE_USER")]
    CreateUser(User),
    /// Overwrite a user with its resolved final state.
    #[serde(rename = "UPDATE_USER")]
    UpdateUser(User),
}

/// Logical queue a command is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandChannel {
    /// Organization-command queue.
    Organizations,
    /// User-command queue.
    Users,
}

impl CommandChannel {
    /// Both channels, in a stable order.
    pub const ALL: [CommandChannel; 2] = [CommandChannel::Organizations, CommandChannel::Users];

    /// Stable label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organizations => "organizations",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for CommandChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity a command writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTarget {
    /// Organization keyed by `orgId`.
    Organization(OrganizationId),
    /// User keyed by `userId`.
    User(UserId),
}

impl fmt::Display for CommandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization(id) => write!(f, "organization:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Reasons a raw queue message cannot be turned into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandDecodeError {
    /// Body is not a JSON object with a string `type`.
    #[error("command message has no type tag")]
    MissingType,
    /// Tag is not one of [`KNOWN_COMMAND_TYPES`].
    #[error("unknown command type: {tag}")]
    UnknownType { tag: String },
    /// Body is not JSON, or the entity fields fail validation.
    #[error("malformed command message: {message}")]
    Malformed { message: String },
}

impl Command {
    /// Decode a raw queue message body.
    ///
    /// Unknown tags are reported separately from malformed payloads so the
    /// consumer can log them distinctly; both are dropped.
    pub fn decode(raw: &str) -> Result<Self, CommandDecodeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|err| CommandDecodeError::Malformed {
                message: err.to_string(),
            })?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(CommandDecodeError::MissingType)?;
        if !KNOWN_COMMAND_TYPES.contains(&tag) {
            return Err(CommandDecodeError::UnknownType {
                tag: tag.to_owned(),
            });
        }
        serde_json::from_value(value).map_err(|err| CommandDecodeError::Malformed {
            message: err.to_string(),
        })
    }

    /// Encode the command as a queue message body.
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Wire tag of this command.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateOrganization(_) => CREATE_ORG,
            Self::UpdateOrganization(_) => UPDATE_ORG,
            Self::CreateUser(_) => CREATE_USER,
            Self::UpdateUser(_) => UPDATE_USER,
        }
    }

    /// Queue this command is routed to.
    pub fn channel(&self) -> CommandChannel {
        match self {
            Self::CreateOrganization(_) | Self::UpdateOrganization(_) => {
                CommandChannel::Organizations
            }
            Self::CreateUser(_) | Self::UpdateUser(_) => CommandChannel::Users,
        }
    }

    /// Entity identifier the command upserts.
    pub fn target(&self) -> CommandTarget {
        match self {
            Self::CreateOrganization(org) | Self::UpdateOrganization(org) => {
                CommandTarget::Organization(org.id().clone())
            }
            Self::CreateUser(user) | Self::UpdateUser(user) => {
                CommandTarget::User(user.id().clone())
            }
        }
    }
}
