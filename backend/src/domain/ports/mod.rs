//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`store`, `command_queue`, `uniqueness_index`) are
//! implemented by outbound adapters. Driving ports (`directory_command`) are
//! implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod command_queue;
mod directory_command;
mod store;
mod uniqueness_index;

#[cfg(test)]
pub use command_queue::{MockCommandQueue, MockCommandSource};
pub use command_queue::{
    CommandQueue, CommandSource, Delivery, DeliveryReceipt, EnqueueError, QueueReceiveError,
};
#[cfg(test)]
pub use directory_command::{
    MockDirectDirectoryCommand, MockDirectoryQuery, MockQueuedDirectoryCommand,
};
pub use directory_command::{
    CreateOrganizationRequest, CreateUserRequest, DirectDirectoryCommand, DirectoryQuery,
    OrganizationAccepted, QueuedDirectoryCommand, UpdateOrganizationRequest, UpdateUserRequest,
    UserAccepted,
};
#[cfg(test)]
pub use store::{MockOrganizationRepository, MockUserRepository};
pub use store::{OrganizationRepository, StoreError, UserRepository};
#[cfg(test)]
pub use uniqueness_index::MockUniquenessIndex;
pub use uniqueness_index::{ClaimOutcome, UniqueKey, UniqueKind, UniquenessIndex};
