//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the organization and user aggregates, the change commands
//! carried by the queue, and the services behind the driving ports. Types are
//! immutable; serde contracts are documented on each type.
//!
//! Public surface:
//! - `Organization`, `User` and their validated components.
//! - `Command` and its routing helpers.
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - Services: `CommandProducerService`, `CommandConsumer`,
//!   `DirectDirectoryService`, `DirectoryQueryService`.

pub(crate) mod identifier;

pub mod command;
pub mod command_consumer;
pub mod command_producer;
pub mod direct_directory;
pub mod directory_guard;
pub mod directory_query;
pub mod error;
pub mod organization;
pub mod ports;
pub mod trace_id;
pub mod uniqueness;
pub mod user;

pub use self::command::{
    Command, CommandChannel, CommandDecodeError, CommandTarget, KNOWN_COMMAND_TYPES,
};
pub use self::command_consumer::{BatchFailure, BatchReport, CommandConsumer, MessageOutcome};
pub use self::command_producer::CommandProducerService;
pub use self::direct_directory::DirectDirectoryService;
pub use self::directory_guard::{Change, DirectoryGuard};
pub use self::directory_query::DirectoryQueryService;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::identifier::IdentifierError;
pub use self::organization::{
    Organization, OrganizationId, OrganizationName, OrganizationValidationError,
};
pub use self::trace_id::TraceId;
pub use self::uniqueness::{ParseUniquenessModeError, UniquenessClaims, UniquenessMode};
pub use self::user::{EmailAddress, User, UserId, UserName, UserValidationError};
