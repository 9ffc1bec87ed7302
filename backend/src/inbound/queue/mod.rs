//! Queue inbound adapter: the polling loop that feeds deliveries to the
//! [`CommandConsumer`].
//!
//! Each batch runs under a fresh [`TraceId`] so log lines from one batch can
//! be correlated. Messages handled before a store failure are acknowledged;
//! the failing message and everything after it are released for redelivery.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CommandSource, Delivery, OrganizationRepository, QueueReceiveError, UserRepository,
};
use crate::domain::{BatchReport, CommandChannel, CommandConsumer, TraceId};

/// Polling knobs for one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Upper bound on deliveries claimed per receive.
    pub batch_size: usize,
    /// Pause after an empty or interrupted batch.
    pub poll_interval: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// What one polling pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerTick {
    /// Nothing was visible on the channel.
    Idle,
    /// Every delivery was handled and acknowledged.
    Drained(BatchReport),
    /// A store failure stopped the batch.
    Interrupted { processed: usize, released: usize },
}

/// Drains one [`CommandChannel`] into a [`CommandConsumer`].
pub struct CommandWorker<O, U> {
    source: Arc<dyn CommandSource>,
    consumer: CommandConsumer<O, U>,
    channel: CommandChannel,
    settings: WorkerSettings,
}

impl<O, U> CommandWorker<O, U>
where
    O: OrganizationRepository,
    U: UserRepository,
{
    pub fn new(
        source: Arc<dyn CommandSource>,
        consumer: CommandConsumer<O, U>,
        channel: CommandChannel,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            source,
            consumer,
            channel,
            settings,
        }
    }

    /// Receive one batch and handle it under a fresh trace scope.
    pub async fn run_once(&self) -> Result<WorkerTick, QueueReceiveError> {
        TraceId::fresh_scope(self.handle_batch()).await
    }

    async fn handle_batch(&self) -> Result<WorkerTick, QueueReceiveError> {
        let deliveries = self
            .source
            .receive(self.channel, self.settings.batch_size)
            .await?;
        if deliveries.is_empty() {
            return Ok(WorkerTick::Idle);
        }
        let redelivered = deliveries
            .iter()
            .filter(|delivery| delivery.receive_count > 1)
            .count();
        debug!(
            channel = %self.channel,
            received = deliveries.len(),
            redelivered,
            "received command batch"
        );

        let bodies: Vec<&str> = deliveries
            .iter()
            .map(|delivery| delivery.body.as_str())
            .collect();
        match self.consumer.process_batch(bodies).await {
            Ok(report) => {
                self.acknowledge_all(&deliveries).await;
                info!(
                    channel = %self.channel,
                    applied = report.applied,
                    dropped = report.dropped,
                    "command batch applied"
                );
                Ok(WorkerTick::Drained(report))
            }
            Err(failure) => {
                let (handled, remaining) = deliveries.split_at(failure.processed);
                self.acknowledge_all(handled).await;
                for delivery in remaining {
                    if let Err(err) = self.source.release(&delivery.receipt).await {
                        warn!(
                            error = %err,
                            receipt = %delivery.receipt,
                            "failed to release delivery; it reappears after the visibility timeout"
                        );
                    }
                }
                warn!(
                    channel = %self.channel,
                    processed = failure.processed,
                    released = remaining.len(),
                    "command batch interrupted by store failure"
                );
                Ok(WorkerTick::Interrupted {
                    processed: failure.processed,
                    released: remaining.len(),
                })
            }
        }
    }

    async fn acknowledge_all(&self, deliveries: &[Delivery]) {
        for delivery in deliveries {
            if let Err(err) = self.source.acknowledge(&delivery.receipt).await {
                warn!(
                    error = %err,
                    receipt = %delivery.receipt,
                    "failed to acknowledge delivery; it will be applied again"
                );
            }
        }
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Full batches are followed immediately by another receive; empty or
    /// interrupted ones wait for the poll interval first.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(channel = %self.channel, "command worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            let pause = match self.run_once().await {
                Ok(WorkerTick::Drained(_)) => false,
                Ok(WorkerTick::Idle | WorkerTick::Interrupted { .. }) => true,
                Err(err) => {
                    warn!(channel = %self.channel, error = %err, "command receive failed");
                    true
                }
            };
            if pause {
                tokio::select! {
                    () = tokio::time::sleep(self.settings.poll_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }
        info!(channel = %self.channel, "command worker stopped");
    }
}

/// Spawn one worker per [`CommandChannel`], all sharing `shutdown`.
pub fn spawn_channel_workers<O, U>(
    source: &Arc<dyn CommandSource>,
    consumer: &CommandConsumer<O, U>,
    settings: WorkerSettings,
    shutdown: &watch::Receiver<bool>,
) -> Vec<JoinHandle<()>>
where
    O: OrganizationRepository + 'static,
    U: UserRepository + 'static,
{
    CommandChannel::ALL
        .into_iter()
        .map(|channel| {
            let worker =
                CommandWorker::new(Arc::clone(source), consumer.clone(), channel, settings);
            tokio::spawn(worker.run(shutdown.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Command;
    use crate::domain::ports::{
        DeliveryReceipt, MockCommandSource, MockOrganizationRepository, MockUserRepository,
        StoreError,
    };
    use crate::outbound::memory::{InMemoryCommandQueue, InMemoryDirectoryStore};
    use crate::test_support::directory::organization;

    fn delivery(receipt: &str, body: String) -> Delivery {
        Delivery {
            receipt: DeliveryReceipt::new(receipt),
            body,
            receive_count: 1,
        }
    }

    fn create_org(id: &str, name: &str) -> String {
        Command::CreateOrganization(organization(id, name, None))
            .to_message()
            .expect("encode")
    }

    fn worker(
        source: MockCommandSource,
        organizations: MockOrganizationRepository,
    ) -> CommandWorker<MockOrganizationRepository, MockUserRepository> {
        CommandWorker::new(
            Arc::new(source),
            CommandConsumer::new(Arc::new(organizations), Arc::new(MockUserRepository::new())),
            CommandChannel::Organizations,
            WorkerSettings {
                batch_size: 5,
                poll_interval: Duration::from_millis(10),
            },
        )
    }

    #[tokio::test]
    async fn empty_receive_is_idle() {
        let mut source = MockCommandSource::new();
        source
            .expect_receive()
            .withf(|channel, max| *channel == CommandChannel::Organizations && *max == 5)
            .returning(|_, _| Ok(Vec::new()));
        source.expect_acknowledge().never();

        let tick = worker(source, MockOrganizationRepository::new())
            .run_once()
            .await
            .expect("tick");

        assert_eq!(tick, WorkerTick::Idle);
    }

    #[tokio::test]
    async fn handled_batches_are_acknowledged_including_dropped_messages() {
        let mut source = MockCommandSource::new();
        let bodies = vec![
            delivery("1", create_org("org-1", "Acme")),
            delivery("2", "not json".to_owned()),
        ];
        source
            .expect_receive()
            .returning(move |_, _| Ok(bodies.clone()));
        source.expect_acknowledge().times(2).returning(|_| Ok(()));
        source.expect_release().never();
        let mut organizations = MockOrganizationRepository::new();
        organizations.expect_upsert().times(1).returning(|_| Ok(()));

        let tick = worker(source, organizations)
            .run_once()
            .await
            .expect("tick");

        assert_eq!(
            tick,
            WorkerTick::Drained(BatchReport {
                applied: 1,
                dropped: 1
            })
        );
    }

    #[tokio::test]
    async fn store_failure_acknowledges_the_prefix_and_releases_the_rest() {
        let mut source = MockCommandSource::new();
        let bodies = vec![
            delivery("1", create_org("org-1", "Acme")),
            delivery("2", create_org("org-2", "Globex")),
            delivery("3", create_org("org-3", "Initech")),
        ];
        source
            .expect_receive()
            .returning(move |_, _| Ok(bodies.clone()));
        source
            .expect_acknowledge()
            .times(1)
            .withf(|receipt| receipt.as_str() == "1")
            .returning(|_| Ok(()));
        source
            .expect_release()
            .times(2)
            .withf(|receipt| receipt.as_str() == "2" || receipt.as_str() == "3")
            .returning(|_| Ok(()));
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

        let tick = worker(source, organizations)
            .run_once()
            .await
            .expect("tick");

        assert_eq!(
            tick,
            WorkerTick::Interrupted {
                processed: 1,
                released: 2
            }
        );
    }

    #[tokio::test]
    async fn acknowledge_failures_do_not_fail_the_tick() {
        let mut source = MockCommandSource::new();
        let bodies = vec![delivery("1", create_org("org-1", "Acme"))];
        source
            .expect_receive()
            .returning(move |_, _| Ok(bodies.clone()));
        source
            .expect_acknowledge()
            .returning(|receipt| Err(QueueReceiveError::receipt(receipt.as_str())));
        let mut organizations = MockOrganizationRepository::new();
        organizations.expect_upsert().returning(|_| Ok(()));

        let tick = worker(source, organizations)
            .run_once()
            .await
            .expect("tick");

        assert!(matches!(tick, WorkerTick::Drained(_)));
    }

    #[tokio::test]
    async fn each_batch_runs_under_a_trace_scope() {
        let mut source = MockCommandSource::new();
        source.expect_receive().returning(|_, _| {
            assert!(TraceId::current().is_some());
            Ok(Vec::new())
        });

        worker(source, MockOrganizationRepository::new())
            .run_once()
            .await
            .expect("tick");
    }

    #[tokio::test]
    async fn spawned_workers_apply_queued_commands() {
        let queue = Arc::new(InMemoryCommandQueue::default());
        queue
            .enqueue_raw(CommandChannel::Organizations, create_org("org-1", "Acme"))
            .expect("enqueue");
        let store = Arc::new(InMemoryDirectoryStore::new());
        let source: Arc<dyn CommandSource> = queue.clone();
        let (sender, receiver) = watch::channel(false);
        let handles = spawn_channel_workers(
            &source,
            &CommandConsumer::new(Arc::clone(&store), Arc::clone(&store)),
            WorkerSettings {
                batch_size: 5,
                poll_interval: Duration::from_millis(5),
            },
            &receiver,
        );

        tokio::time::timeout(Duration::from_secs(5), async {
            while queue.pending(CommandChannel::Organizations) > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("queue drains in time");
        sender.send_replace(true);
        for handle in handles {
            handle.await.expect("worker task completes");
        }

        let stored = OrganizationRepository::list(store.as_ref())
            .await
            .expect("list");
        assert_eq!(stored, vec![organization("org-1", "Acme", None)]);
    }

    #[tokio::test]
    async fn run_stops_when_shutdown_is_signalled() {
        let mut source = MockCommandSource::new();
        source
            .expect_receive()
            .returning(|_, _| Err(QueueReceiveError::unavailable("offline")));
        let (sender, receiver) = watch::channel(false);
        let handle = tokio::spawn(worker(source, MockOrganizationRepository::new()).run(receiver));

        sender.send(true).expect("worker listening");

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker stops in time")
            .expect("worker task completes");
    }
}
