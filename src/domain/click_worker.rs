//! Click event consumer loop.
//!
//! Pulls deliveries from the click queue with at most `prefetch` of them in
//! flight, stores each well-formed event and settles it with the broker:
//!
//! | Payload                        | Store  | Outcome                   |
//! |--------------------------------|--------|---------------------------|
//! | not a click event              | -      | reject, no requeue        |
//! | missing required field         | -      | reject, no requeue        |
//! | well-formed                    | ok     | ack                       |
//! | well-formed                    | failed | reject, requeue           |
//!
//! Redelivered events are stored again; there is no deduplication. A requeue
//! waits [`REQUEUE_DELAY`] with its prefetch slot held, so an event store
//! outage slows the loop down instead of cycling the same events.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickEventRepository;
use crate::infrastructure::queue::{Delivery, QueueConsumer};

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Pause before a delivery whose write failed goes back on the queue.
pub const REQUEUE_DELAY: Duration = Duration::from_secs(1);

/// How a delivery is settled with the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Ack,
    Reject { requeue: bool },
}

impl ConsumeOutcome {
    fn label(self) -> &'static str {
        match self {
            ConsumeOutcome::Ack => "stored",
            ConsumeOutcome::Reject { requeue: true } => "requeued",
            ConsumeOutcome::Reject { requeue: false } => "malformed",
        }
    }
}

/// Validates and stores one delivery, returning how it must be settled.
pub async fn process_delivery(
    delivery: &Delivery,
    store: &dyn ClickEventRepository,
) -> ConsumeOutcome {
    let event = match ClickEvent::from_payload(&delivery.payload) {
        Ok(event) => event,
        Err(e) => {
            warn!(delivery_id = %delivery.id, error = %e, "Discarding malformed click event");
            return ConsumeOutcome::Reject { requeue: false };
        }
    };

    match store.create(&event).await {
        Ok(()) => {
            debug!(
                delivery_id = %delivery.id,
                shortcode = %event.shortcode,
                redelivered = delivery.redelivered,
                "Click event stored"
            );
            ConsumeOutcome::Ack
        }
        Err(e) => {
            warn!(
                delivery_id = %delivery.id,
                shortcode = %event.shortcode,
                error = %e,
                "Failed to store click event, requeueing"
            );
            ConsumeOutcome::Reject { requeue: true }
        }
    }
}

/// Reports `outcome` to the broker.
///
/// A failed ack or reject is only logged: the delivery stays pending and the
/// broker hands it out again.
pub async fn settle(consumer: &dyn QueueConsumer, delivery: &Delivery, outcome: ConsumeOutcome) {
    let result = match outcome {
        ConsumeOutcome::Ack => consumer.ack(delivery).await,
        ConsumeOutcome::Reject { requeue } => consumer.reject(delivery, requeue).await,
    };

    metrics::counter!("clicks_consumed_total", "outcome" => outcome.label()).increment(1);

    if let Err(e) = result {
        error!(delivery_id = %delivery.id, ?outcome, error = %e, "Failed to settle delivery");
    }
}

/// Runs the consumer until the broker cancels it or `shutdown` resolves.
///
/// Deliveries are processed concurrently, never more than `prefetch` at a
/// time. Receive errors are retried with a doubling backoff capped at 5 s. On
/// exit, deliveries already in flight are allowed to finish and settle.
pub async fn run_click_worker<S>(
    consumer: Arc<dyn QueueConsumer>,
    store: Arc<dyn ClickEventRepository>,
    prefetch: usize,
    shutdown: S,
) where
    S: Future<Output = ()> + Send,
{
    let prefetch = prefetch.max(1);
    let semaphore = Arc::new(Semaphore::new(prefetch));
    let mut tasks = JoinSet::new();
    let mut backoff = INITIAL_BACKOFF;
    tokio::pin!(shutdown);

    info!(prefetch, "Click consumer started");

    loop {
        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                error!(error = %e, "Click processing task panicked");
            }
        }

        let first = tokio::select! {
            _ = &mut shutdown => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };
        let max = 1 + semaphore.available_permits();

        let received = tokio::select! {
            _ = &mut shutdown => break,
            received = consumer.receive(max) => received,
        };

        match received {
            Ok(None) => {
                info!("Click consumer cancelled by broker");
                break;
            }
            Ok(Some(batch)) => {
                backoff = INITIAL_BACKOFF;
                let mut first = Some(first);

                for delivery in batch {
                    let permit = match first.take() {
                        Some(permit) => permit,
                        None => match semaphore.clone().try_acquire_owned() {
                            Ok(permit) => permit,
                            Err(_) => {
                                // More than requested; leave it pending for redelivery.
                                warn!(delivery_id = %delivery.id, "Delivery exceeds prefetch");
                                continue;
                            }
                        },
                    };

                    let consumer = Arc::clone(&consumer);
                    let store = Arc::clone(&store);
                    tasks.spawn(async move {
                        let _permit = permit;
                        let outcome = process_delivery(&delivery, store.as_ref()).await;
                        if outcome == (ConsumeOutcome::Reject { requeue: true }) {
                            tokio::time::sleep(REQUEUE_DELAY).await;
                        }
                        settle(consumer.as_ref(), &delivery, outcome).await;
                    });
                }
            }
            Err(e) => {
                drop(first);
                warn!(
                    error = %e,
                    backoff_ms = backoff.as_millis() as u64,
                    "Click queue receive failed"
                );
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }

    let in_flight = tasks.len();
    if in_flight > 0 {
        info!(in_flight, "Draining in-flight click events");
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Click processing task panicked");
        }
    }

    info!("Click consumer stopped");
}
