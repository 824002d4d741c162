//! Broker contracts for the click queue.

use async_trait::async_trait;

/// A message handed to a consumer and awaiting acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Broker-assigned message id.
    pub id: String,
    pub payload: Vec<u8>,
    /// True when the message was taken over from a consumer that never
    /// acknowledged it.
    pub redelivered: bool,
}

/// Errors raised by the queue binding.
///
/// These never reach HTTP callers: the publisher swallows them and the
/// consumer loop retries or lets the broker redeliver.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("broker unavailable: {0}")]
    Unavailable(String),
    #[error("broker rejected command: {0}")]
    Command(String),
}

impl From<redis::RedisError> for QueueError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
            QueueError::Unavailable(e.to_string())
        } else {
            QueueError::Command(e.to_string())
        }
    }
}

/// Producer side of the durable click queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickQueue: Send + Sync {
    /// Enqueues a persistent message.
    async fn publish(&self, payload: Vec<u8>) -> Result<(), QueueError>;

    /// Checks if the broker is reachable.
    async fn health_check(&self) -> bool;
}

/// Consumer side of the durable click queue with manual acknowledgement.
///
/// A delivery stays owned by this consumer until it is acked or rejected. If
/// the consumer disappears first, the broker hands the delivery to another
/// consumer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueConsumer: Send + Sync {
    /// Fetches at most `max` deliveries.
    ///
    /// May wait for a bounded poll interval and return an empty batch.
    /// Returns `Ok(None)` once the broker has cancelled this consumer.
    async fn receive(&self, max: usize) -> Result<Option<Vec<Delivery>>, QueueError>;

    /// Removes a processed delivery from the queue.
    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// Gives a delivery back: requeued for another attempt, or discarded to the
    /// dead-letter stream when `requeue` is false.
    async fn reject(&self, delivery: &Delivery, requeue: bool) -> Result<(), QueueError>;
}
