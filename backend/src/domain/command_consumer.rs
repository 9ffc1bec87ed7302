//! Command consumer.
//!
//! Applies queued commands to the store as unconditional upserts keyed by
//! entity identifier. Nothing is re-validated at apply time: if two racing
//! producers both passed their pre-checks, both commands land.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::ports::{OrganizationRepository, StoreError, UserRepository};
use crate::domain::{Command, CommandDecodeError, CommandTarget};

/// Result of handling a single raw message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// The command was written to the store.
    Applied(CommandTarget),
    /// The message could not be decoded and was discarded.
    Dropped(CommandDecodeError),
}

/// Counts for a fully processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: usize,
    pub dropped: usize,
}

/// A store failure that stopped a batch part-way.
///
/// `processed` messages (applied or dropped) preceded the failing one; the
/// failing message and everything after it were not handled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command batch stopped after {processed} message(s): {source}")]
pub struct BatchFailure {
    pub processed: usize,
    pub source: StoreError,
}

/// Applies decoded commands to the organization and user repositories.
pub struct CommandConsumer<O, U> {
    organizations: Arc<O>,
    users: Arc<U>,
}

impl<O, U> Clone for CommandConsumer<O, U> {
    fn clone(&self) -> Self {
        Self {
            organizations: Arc::clone(&self.organizations),
            users: Arc::clone(&self.users),
        }
    }
}

impl<O, U> CommandConsumer<O, U>
where
    O: OrganizationRepository,
    U: UserRepository,
{
    pub fn new(organizations: Arc<O>, users: Arc<U>) -> Self {
        Self {
            organizations,
            users,
        }
    }

    /// Upsert the snapshot a command carries.
    pub async fn apply(&self, command: &Command) -> Result<(), StoreError> {
        match command {
            Command::CreateOrganization(org) | Command::UpdateOrganization(org) => {
                self.organizations.upsert(org).await
            }
            Command::CreateUser(user) | Command::UpdateUser(user) => {
                self.users.upsert(user).await
            }
        }
    }

    /// Decode and apply one raw message. Undecodable messages are dropped;
    /// only store failures are errors.
    pub async fn handle_message(&self, raw: &str) -> Result<MessageOutcome, StoreError> {
        let command = match Command::decode(raw) {
            Ok(command) => command,
            Err(err) => {
                warn!(error = %err, body = raw, "dropping undecodable command message");
                return Ok(MessageOutcome::Dropped(err));
            }
        };
        self.apply(&command).await?;
        let target = command.target();
        debug!(command = command.kind(), target = %target, "directory command applied");
        Ok(MessageOutcome::Applied(target))
    }

    /// Handle messages in order, stopping at the first store failure.
    pub async fn process_batch<I, S>(&self, bodies: I) -> Result<BatchReport, BatchFailure>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BatchReport::default();
        for body in bodies {
            match self.handle_message(body.as_ref()).await {
                Ok(MessageOutcome::Applied(_)) => report.applied += 1,
                Ok(MessageOutcome::Dropped(_)) => report.dropped += 1,
                Err(source) => {
                    let processed = report.applied + report.dropped;
                    error!(error = %source, processed, "store failure while applying commands");
                    return Err(BatchFailure { processed, source });
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockOrganizationRepository, MockUserRepository};
    use crate::test_support::directory::{organization, user};
    use rstest::rstest;

    fn consumer(
        organizations: MockOrganizationRepository,
        users: MockUserRepository,
    ) -> CommandConsumer<MockOrganizationRepository, MockUserRepository> {
        CommandConsumer::new(Arc::new(organizations), Arc::new(users))
    }

    fn message(command: Command) -> String {
        command.to_message().expect("encode command")
    }

    #[rstest]
    #[case(Command::CreateOrganization(organization("org-1", "Acme", None)))]
    #[case(Command::UpdateOrganization(organization("org-1", "Acme", Some("Rockets"))))]
    #[tokio::test]
    async fn organization_commands_upsert_organizations(#[case] command: Command) {
        let expected = match &command {
            Command::CreateOrganization(org) | Command::UpdateOrganization(org) => org.clone(),
            _ => unreachable!("organization cases only"),
        };
        let mut organizations = MockOrganizationRepository::new();
        organizations
            .expect_upsert()
            .times(1)
            .withf(move |org| *org == expected)
            .returning(|_| Ok(()));
        let mut users = MockUserRepository::new();
        users.expect_upsert().never();

        consumer(organizations, users)
            .apply(&command)
            .await
            .expect("applied");
    }

    #[rstest]
    #[case(Command::CreateUser(user("user-1", "org-1", "Bo", "bo@x.com")))]
    #[case(Command::UpdateUser(user("user-1", "org-1", "Bob", "bo@x.com")))]
    #[tokio::test]
    async fn user_commands_upsert_users(#[case] command: Command) {
        let mut organizations = MockOrganizationRepository::new();
        organizations.expect_upsert().never();
        let mut users = MockUserRepository::new();
        users.expect_upsert().times(1).returning(|_| Ok(()));

        consumer(organizations, users)
            .apply(&command)
            .await
            .expect("applied");
    }

    #[tokio::test]
    async fn undecodable_messages_are_dropped_without_store_access() {
        let mut organizations = MockOrganizationRepository::new();
        organizations.expect_upsert().never();
        let consumer = consumer(organizations, MockUserRepository::new());

        let report = consumer
            .process_batch([r#"{"type":"ARCHIVE_ORG","orgId":"org-1"}"#, "{{"])
            .await
            .expect("batch completes");

        assert_eq!(report, BatchReport { applied: 0, dropped: 2 });
    }

    #[tokio::test]
    async fn store_failure_stops_the_batch() {
        let mut organizations = MockOrganizationRepository::new();
        let mut sequence = mockall::Sequence::new();
        organizations
            .expect_upsert()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        organizations
            .expect_upsert()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Err(StoreError::connection("lost")));
        let consumer = consumer(organizations, MockUserRepository::new());
        let bodies = vec![
            message(Command::CreateOrganization(organization("org-1", "Acme", None))),
            "garbage".to_owned(),
            message(Command::CreateOrganization(organization("org-2", "Globex", None))),
            message(Command::CreateOrganization(organization("org-3", "Initech", None))),
        ];

        let failure = consumer
            .process_batch(&bodies)
            .await
            .expect_err("store failure");

        assert_eq!(failure.processed, 2);
        assert_eq!(failure.source, StoreError::connection("lost"));
    }

    #[tokio::test]
    async fn handle_message_reports_the_applied_target() {
        let mut users = MockUserRepository::new();
        users.expect_upsert().returning(|_| Ok(()));
        let consumer = consumer(MockOrganizationRepository::new(), users);

        let outcome = consumer
            .handle_message(&message(Command::CreateUser(user(
                "user-1", "org-1", "Bo", "bo@x.com",
            ))))
            .await
            .expect("handled");

        assert_eq!(
            outcome,
            MessageOutcome::Applied(CommandTarget::User(
                crate::domain::UserId::new("user-1").expect("id")
            ))
        );
    }
}
