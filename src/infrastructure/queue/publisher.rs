//! Fire-and-forget click event publisher.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::broker::ClickQueue;
use crate::domain::click_event::ClickEvent;

/// Serializes click events and hands them to the click queue.
///
/// Publishing is best-effort. A failure is logged and counted, then the event
/// is dropped; the redirect that produced it has already succeeded and must
/// not be delayed or failed by analytics.
pub struct ClickPublisher {
    queue: Arc<dyn ClickQueue>,
}

impl ClickPublisher {
    pub fn new(queue: Arc<dyn ClickQueue>) -> Self {
        Self { queue }
    }

    /// Publishes one event. Never fails.
    pub async fn publish(&self, event: &ClickEvent) {
        let payload = match event.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(shortcode = %event.shortcode, error = %e, "Failed to serialize click event");
                metrics::counter!("clicks_publish_failed_total").increment(1);
                return;
            }
        };

        match self.queue.publish(payload).await {
            Ok(()) => {
                debug!(shortcode = %event.shortcode, ip = %event.ip, "Click event published");
                metrics::counter!("clicks_published_total").increment(1);
            }
            Err(e) => {
                warn!(shortcode = %event.shortcode, error = %e, "Failed to publish click event");
                metrics::counter!("clicks_publish_failed_total").increment(1);
            }
        }
    }

    /// Publishes on a detached task.
    ///
    /// The caller may drop the handle; nothing on the request path joins it.
    pub fn spawn_publish(self: &Arc<Self>, event: ClickEvent) -> JoinHandle<()> {
        let publisher = Arc::clone(self);
        tokio::spawn(async move { publisher.publish(&event).await })
    }
}
