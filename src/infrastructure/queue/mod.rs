//! Durable click queue.
//!
//! - [`ClickQueue`] / [`QueueConsumer`] - Broker contracts with manual acknowledgement
//! - [`RedisStreamQueue`] / [`RedisStreamConsumer`] - Redis Streams binding
//! - [`ClickPublisher`] - Best-effort, detached publishing from the redirect path

mod broker;
mod publisher;
mod redis_stream;

pub use broker::{ClickQueue, Delivery, QueueConsumer, QueueError};
pub use publisher::ClickPublisher;
pub use redis_stream::{RedisStreamConsumer, RedisStreamQueue, StreamConsumerOptions};

#[cfg(test)]
pub use broker::{MockClickQueue, MockQueueConsumer};
