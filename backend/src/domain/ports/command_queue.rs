//! Driven ports for the command queue.
//!
//! Delivery is at-least-once with no ordering guarantee. Producers only see
//! [`CommandQueue`]; workers drain the queue through [`CommandSource`].

use std::fmt;

use async_trait::async_trait;

use crate::domain::{Command, CommandChannel};

use super::define_port_error;

define_port_error! {
    /// Failures raised while sending a command.
    pub enum EnqueueError {
        /// Queue infrastructure is unavailable.
        Unavailable { message: String } => "command queue is unavailable: {message}",
        /// The queue refused the message.
        Rejected { message: String } => "command was rejected by the queue: {message}",
    }
}

define_port_error! {
    /// Failures raised while receiving, acknowledging, or releasing deliveries.
    pub enum QueueReceiveError {
        /// Queue infrastructure is unavailable.
        Unavailable { message: String } => "command queue is unavailable: {message}",
        /// The receipt does not name an in-flight delivery.
        Receipt { receipt: String } => "unknown delivery receipt: {receipt}",
    }
}

/// Producer-side queue access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandQueue: Send + Sync {
    /// Send a command to its channel. Durable once this returns `Ok`.
    async fn enqueue(&self, command: &Command) -> Result<(), EnqueueError>;
}

/// Opaque handle identifying one in-flight delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryReceipt(String);

impl DeliveryReceipt {
    /// Wrap an adapter-specific receipt.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw receipt.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DeliveryReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A received message, hidden from other receivers until acknowledged,
/// released, or its visibility timeout lapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Handle used to acknowledge or release the delivery.
    pub receipt: DeliveryReceipt,
    /// Raw message body.
    pub body: String,
    /// How many times the message has been received, this delivery included.
    pub receive_count: u32,
}

/// Consumer-side queue access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandSource: Send + Sync {
    /// Receive up to `max` visible deliveries from `channel`.
    async fn receive(
        &self,
        channel: CommandChannel,
        max: usize,
    ) -> Result<Vec<Delivery>, QueueReceiveError>;

    /// Delete a delivery permanently.
    async fn acknowledge(&self, receipt: &DeliveryReceipt) -> Result<(), QueueReceiveError>;

    /// Make a delivery visible again immediately.
    async fn release(&self, receipt: &DeliveryReceipt) -> Result<(), QueueReceiveError>;
}
