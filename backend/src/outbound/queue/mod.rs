//! Command queue adapters.
//!
//! - [`PostgresCommandQueue`]: durable table queue with visibility timeouts
//!   and dead-lettering.
//! - [`InMemoryCommandQueue`](crate::outbound::memory::InMemoryCommandQueue)
//!   provides the same delivery semantics in process.

use std::time::Duration;

use crate::domain::CommandChannel;

mod postgres_command_queue;
pub(crate) mod receipt;

pub use postgres_command_queue::PostgresCommandQueue;

/// Destination names for the two command channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueNames {
    pub organizations: String,
    pub users: String,
}

impl QueueNames {
    pub fn new(organizations: impl Into<String>, users: impl Into<String>) -> Self {
        Self {
            organizations: organizations.into(),
            users: users.into(),
        }
    }

    /// Destination name for `channel`.
    pub fn for_channel(&self, channel: CommandChannel) -> &str {
        match channel {
            CommandChannel::Organizations => self.organizations.as_str(),
            CommandChannel::Users => self.users.as_str(),
        }
    }
}

impl Default for QueueNames {
    fn default() -> Self {
        Self::new("organization-commands", "user-commands")
    }
}

/// Redelivery policy shared by queue adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// How long a received message stays hidden.
    pub visibility_timeout: Duration,
    /// Receives allowed before a message is dead-lettered.
    pub max_receive_count: u32,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            visibility_timeout: Duration::from_secs(30),
            max_receive_count: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CommandChannel::Organizations, "orgs")]
    #[case(CommandChannel::Users, "people")]
    fn routes_channels_to_configured_names(
        #[case] channel: CommandChannel,
        #[case] expected: &str,
    ) {
        let names = QueueNames::new("orgs", "people");
        assert_eq!(names.for_channel(channel), expected);
    }
}
