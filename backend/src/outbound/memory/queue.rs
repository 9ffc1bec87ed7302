//! In-memory command queue with visibility-timeout redelivery.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use tracing::warn;

use crate::domain::ports::{
    CommandQueue, CommandSource, Delivery, DeliveryReceipt, EnqueueError, QueueReceiveError,
};
use crate::domain::{Command, CommandChannel};
use crate::outbound::queue::{DeliveryPolicy, receipt};

#[derive(Debug, Clone)]
struct StoredMessage {
    channel: CommandChannel,
    body: String,
    receive_count: u32,
    visible_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    messages: BTreeMap<u64, StoredMessage>,
    dead_letters: Vec<StoredMessage>,
}

/// Process-local [`CommandQueue`] and [`CommandSource`].
///
/// Messages are delivered oldest first, but a released or timed-out message
/// rejoins at its original position, so consumers must not rely on order.
pub struct InMemoryCommandQueue {
    clock: Arc<dyn Clock>,
    policy: DeliveryPolicy,
    state: Mutex<QueueState>,
}

impl Default for InMemoryCommandQueue {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock), DeliveryPolicy::default())
    }
}

impl InMemoryCommandQueue {
    pub fn new(clock: Arc<dyn Clock>, policy: DeliveryPolicy) -> Self {
        Self {
            clock,
            policy,
            state: Mutex::new(QueueState::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, QueueState>, QueueReceiveError> {
        self.state
            .lock()
            .map_err(|_| QueueReceiveError::unavailable("in-memory queue lock poisoned"))
    }

    /// Append a raw body to `channel`, bypassing encoding.
    ///
    /// Lets callers inject messages written by other producers.
    pub fn enqueue_raw(
        &self,
        channel: CommandChannel,
        body: impl Into<String>,
    ) -> Result<(), EnqueueError> {
        let now = self.clock.utc();
        let mut state = self
            .state
            .lock()
            .map_err(|_| EnqueueError::unavailable("in-memory queue lock poisoned"))?;
        state.next_id += 1;
        let id = state.next_id;
        state.messages.insert(
            id,
            StoredMessage {
                channel,
                body: body.into(),
                receive_count: 0,
                visible_at: now,
            },
        );
        Ok(())
    }

    /// Messages on `channel` not yet acknowledged or dead-lettered, visible
    /// or not.
    pub fn pending(&self, channel: CommandChannel) -> usize {
        self.lock()
            .map(|state| {
                state
                    .messages
                    .values()
                    .filter(|message| message.channel == channel)
                    .count()
            })
            .unwrap_or_default()
    }

    /// Bodies of dead-lettered messages.
    pub fn dead_letters(&self) -> Vec<String> {
        self.lock()
            .map(|state| {
                state
                    .dead_letters
                    .iter()
                    .map(|message| message.body.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn visibility_timeout(&self) -> TimeDelta {
        TimeDelta::from_std(self.policy.visibility_timeout).unwrap_or(TimeDelta::MAX)
    }

    /// Message held under `receipt`, if the receipt is still current.
    fn current_id(
        state: &QueueState,
        receipt: &DeliveryReceipt,
    ) -> Result<u64, QueueReceiveError> {
        let (id, receive_count) = receipt::parse::<u64>(receipt)?;
        match state.messages.get(&id) {
            Some(message) if message.receive_count == receive_count => Ok(id),
            _ => Err(QueueReceiveError::receipt(receipt.as_str())),
        }
    }
}

#[async_trait]
impl CommandQueue for InMemoryCommandQueue {
    async fn enqueue(&self, command: &Command) -> Result<(), EnqueueError> {
        let body = command
            .to_message()
            .map_err(|err| EnqueueError::rejected(err.to_string()))?;
        self.enqueue_raw(command.channel(), body)
    }
}

#[async_trait]
impl CommandSource for InMemoryCommandQueue {
    async fn receive(
        &self,
        channel: CommandChannel,
        max: usize,
    ) -> Result<Vec<Delivery>, QueueReceiveError> {
        let now = self.clock.utc();
        let hidden_until = now.checked_add_signed(self.visibility_timeout()).unwrap_or(now);
        let max_receive_count = self.policy.max_receive_count;
        let mut state = self.lock()?;

        let exhausted: Vec<u64> = state
            .messages
            .iter()
            .filter(|(_, message)| {
                message.channel == channel
                    && message.visible_at <= now
                    && message.receive_count >= max_receive_count
            })
            .map(|(id, _)| *id)
            .collect();
        for id in exhausted {
            if let Some(message) = state.messages.remove(&id) {
                warn!(
                    channel = %channel,
                    receive_count = message.receive_count,
                    "dead-lettered command message"
                );
                state.dead_letters.push(message);
            }
        }

        let mut deliveries = Vec::new();
        for (id, message) in state
            .messages
            .iter_mut()
            .filter(|(_, message)| message.channel == channel && message.visible_at <= now)
            .take(max)
        {
            message.receive_count += 1;
            message.visible_at = hidden_until;
            deliveries.push(Delivery {
                receipt: receipt::issue(id, message.receive_count),
                body: message.body.clone(),
                receive_count: message.receive_count,
            });
        }
        Ok(deliveries)
    }

    async fn acknowledge(&self, receipt: &DeliveryReceipt) -> Result<(), QueueReceiveError> {
        let mut state = self.lock()?;
        let id = Self::current_id(&state, receipt)?;
        state.messages.remove(&id);
        Ok(())
    }

    async fn release(&self, receipt: &DeliveryReceipt) -> Result<(), QueueReceiveError> {
        let now = self.clock.utc();
        let mut state = self.lock()?;
        let id = Self::current_id(&state, receipt)?;
        if let Some(message) = state.messages.get_mut(&id) {
            message.visible_at = now;
        }
        Ok(())
    }
}
