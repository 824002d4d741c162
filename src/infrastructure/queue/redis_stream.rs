//! Redis Streams binding of the durable click queue.
//!
//! | Queue operation            | Redis commands                                   |
//! |----------------------------|--------------------------------------------------|
//! | publish                    | `XADD <queue> * payload <bytes>`                 |
//! | deliver (crashed consumer) | `XAUTOCLAIM <queue> <group> <me> <idle> 0-0`     |
//! | deliver (new)              | `XREADGROUP GROUP <group> <me> COUNT n ... >`    |
//! | ack                        | `XACK` + `XDEL`                                  |
//! | reject, requeue            | `XADD <queue>` + `XACK` + `XDEL` (atomic)        |
//! | reject, discard            | `XADD <queue>:dead` + `XACK` + `XDEL` (atomic)   |
//!
//! Deliveries read but never acknowledged stay in the group's pending list.
//! Once they have been idle for `claim_idle`, any consumer of the group takes
//! them over, which is how a crashed consumer's work gets redelivered.
//! Durability across broker restarts follows the Redis persistence settings
//! (AOF recommended).

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::streams::{StreamAutoClaimReply, StreamId, StreamReadReply};
use std::time::Duration;
use tracing::{debug, info};

use super::broker::{ClickQueue, Delivery, QueueConsumer, QueueError};

const PAYLOAD_FIELD: &str = "payload";
const DEAD_LETTER_MAXLEN: usize = 10_000;

fn group_name(queue: &str) -> String {
    format!("{queue}-consumers")
}

fn dead_letter_name(queue: &str) -> String {
    format!("{queue}:dead")
}

/// Producer handle for the click stream.
pub struct RedisStreamQueue {
    conn: ConnectionManager,
    stream: String,
}

impl RedisStreamQueue {
    pub fn new(conn: ConnectionManager, queue_name: impl Into<String>) -> Self {
        Self {
            conn,
            stream: queue_name.into(),
        }
    }
}

#[async_trait]
impl ClickQueue for RedisStreamQueue {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let _id: String = redis::cmd("XADD")
            .arg(&self.stream)
            .arg("*")
            .arg(PAYLOAD_FIELD)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }
}

/// Settings for a stream consumer.
#[derive(Debug, Clone)]
pub struct StreamConsumerOptions {
    pub queue_name: String,
    pub consumer_name: String,
    /// Minimum idle time before another consumer's pending delivery is taken over.
    pub claim_idle: Duration,
    /// Pause after an empty read.
    pub poll_interval: Duration,
}

/// A named member of the click stream's consumer group.
pub struct RedisStreamConsumer {
    conn: ConnectionManager,
    stream: String,
    group: String,
    consumer: String,
    dead_letter: String,
    claim_idle: Duration,
    poll_interval: Duration,
}

impl RedisStreamConsumer {
    /// Joins the consumer group, creating the stream and group if needed.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if the group cannot be created.
    pub async fn subscribe(
        conn: ConnectionManager,
        options: StreamConsumerOptions,
    ) -> Result<Self, QueueError> {
        let group = group_name(&options.queue_name);
        let mut c = conn.clone();

        let created: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&options.queue_name)
            .arg(&group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut c)
            .await;

        match created {
            Ok(()) => info!(queue = %options.queue_name, group, "Consumer group created"),
            Err(e) if e.code() == Some("BUSYGROUP") => {
                debug!(queue = %options.queue_name, group, "Consumer group already exists")
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            conn,
            dead_letter: dead_letter_name(&options.queue_name),
            stream: options.queue_name,
            group,
            consumer: options.consumer_name,
            claim_idle: options.claim_idle,
            poll_interval: options.poll_interval,
        })
    }

    fn to_delivery(entry: StreamId, redelivered: bool) -> Delivery {
        let payload = entry.get::<Vec<u8>>(PAYLOAD_FIELD).unwrap_or_default();
        Delivery {
            id: entry.id,
            payload,
            redelivered,
        }
    }

    async fn claim_stale(&self, max: usize) -> Result<Vec<Delivery>, redis::RedisError> {
        let mut conn = self.conn.clone();
        let reply: StreamAutoClaimReply = redis::cmd("XAUTOCLAIM")
            .arg(&self.stream)
            .arg(&self.group)
            .arg(&self.consumer)
            .arg(self.claim_idle.as_millis() as u64)
            .arg("0-0")
            .arg("COUNT")
            .arg(max)
            .query_async(&mut conn)
            .await?;

        Ok(reply
            .claimed
            .into_iter()
            .map(|entry| Self::to_delivery(entry, true))
            .collect())
    }

    async fn read_new(&self, max: usize) -> Result<Vec<Delivery>, redis::RedisError> {
        let mut conn = self.conn.clone();
        let reply: Option<StreamReadReply> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.group)
            .arg(&self.consumer)
            .arg("COUNT")
            .arg(max)
            .arg("STREAMS")
            .arg(&self.stream)
            .arg(">")
            .query_async(&mut conn)
            .await?;

        Ok(reply
            .map(|r| r.keys)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|key| key.ids)
            .map(|entry| Self::to_delivery(entry, false))
            .collect())
    }

    async fn fetch(&self, max: usize) -> Result<Vec<Delivery>, redis::RedisError> {
        let claimed = self.claim_stale(max).await?;
        if !claimed.is_empty() {
            return Ok(claimed);
        }
        self.read_new(max).await
    }

    /// Acknowledges and deletes `delivery`, optionally re-adding its payload to
    /// `target` in the same transaction.
    async fn settle(&self, delivery: &Delivery, target: Option<&str>) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic();

        if let Some(target) = target {
            if target == self.dead_letter {
                pipe.cmd("XADD")
                    .arg(target)
                    .arg("MAXLEN")
                    .arg("~")
                    .arg(DEAD_LETTER_MAXLEN)
                    .arg("*")
                    .arg(PAYLOAD_FIELD)
                    .arg(&delivery.payload)
                    .arg("source_id")
                    .arg(&delivery.id)
                    .ignore();
            } else {
                pipe.cmd("XADD")
                    .arg(target)
                    .arg("*")
                    .arg(PAYLOAD_FIELD)
                    .arg(&delivery.payload)
                    .ignore();
            }
        }

        pipe.cmd("XACK")
            .arg(&self.stream)
            .arg(&self.group)
            .arg(&delivery.id)
            .ignore()
            .cmd("XDEL")
            .arg(&self.stream)
            .arg(&delivery.id)
            .ignore();

        pipe.query_async::<()>(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl QueueConsumer for RedisStreamConsumer {
    async fn receive(&self, max: usize) -> Result<Option<Vec<Delivery>>, QueueError> {
        match self.fetch(max.max(1)).await {
            Ok(deliveries) => {
                if deliveries.is_empty() {
                    tokio::time::sleep(self.poll_interval).await;
                }
                Ok(Some(deliveries))
            }
            // The group or stream was removed: the broker has cancelled us.
            Err(e) if e.code() == Some("NOGROUP") => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        self.settle(delivery, None).await
    }

    async fn reject(&self, delivery: &Delivery, requeue: bool) -> Result<(), QueueError> {
        if requeue {
            let stream = self.stream.clone();
            self.settle(delivery, Some(&stream)).await
        } else {
            let dead_letter = self.dead_letter.clone();
            self.settle(delivery, Some(&dead_letter)).await
        }
    }
}
