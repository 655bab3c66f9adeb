//! Completion notifications.
//!
//! When a collection finishes, its id is published to a broker queue and,
//! if someone is listening on the collection's label, a JSON event is
//! pushed to them directly.

#[cfg(feature = "amqp")]
mod amqp;
mod memory;
mod push;

#[cfg(feature = "amqp")]
pub use amqp::AmqpPublisher;
pub use memory::MemoryQueue;
pub use push::PushChannels;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::NotifyError;
use crate::models::artifact::ArtifactCollection;

/// Result type for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Broker side of notifications.
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    /// Publish `payload` as one message on `queue`.
    async fn send_to_queue(&self, queue: &str, payload: &[u8]) -> Result<()>;
}

/// Event pushed to a collection's listeners once it is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub event: String,
    pub collection_id: String,
    pub label: String,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CompletionEvent {
    pub fn processed(
        collection: &ArtifactCollection,
        succeeded: usize,
        skipped: usize,
        failed: usize,
    ) -> Self {
        Self {
            event: "collection_processed".to_string(),
            collection_id: collection.id.clone(),
            label: collection.label.clone(),
            succeeded,
            skipped,
            failed,
        }
    }
}

/// Sends completion notifications, built once at startup.
pub struct Notifier {
    queue: String,
    publisher: Option<Arc<dyn QueuePublisher>>,
    channels: PushChannels,
}

impl Notifier {
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
            publisher: None,
            channels: PushChannels::new(),
        }
    }

    /// Publish to a broker.
    pub fn with_publisher(mut self, publisher: Arc<dyn QueuePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Listeners keyed by collection label.
    pub fn channels(&self) -> &PushChannels {
        &self.channels
    }

    /// Announce that `collection` finished.
    ///
    /// Failures are logged and swallowed; the collection is processed
    /// whether or not anyone hears about it.
    pub async fn collection_processed(&self, collection: &ArtifactCollection, event: CompletionEvent) {
        match &self.publisher {
            Some(publisher) => {
                match publisher
                    .send_to_queue(&self.queue, collection.id.as_bytes())
                    .await
                {
                    Ok(()) => info!("Sent notification to {} ({})", self.queue, collection.id),
                    Err(e) => warn!("Failed to notify {} for {}: {}", self.queue, collection.id, e),
                }
            }
            None => warn!(
                "No broker configured, {} not announced on {}",
                collection.id, self.queue
            ),
        }

        match serde_json::to_string(&event) {
            Ok(message) => {
                if self.channels.push(&collection.label, message).await {
                    debug!("Pushed completion of {} to {}", collection.id, collection.label);
                }
            }
            Err(e) => warn!("Failed to encode completion event: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn collection() -> ArtifactCollection {
        ArtifactCollection {
            id: "artc_1".to_string(),
            label: "batch-7".to_string(),
            processed: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct BrokenQueue;

    #[async_trait]
    impl QueuePublisher for BrokenQueue {
        async fn send_to_queue(&self, queue: &str, _payload: &[u8]) -> Result<()> {
            Err(NotifyError::Publish {
                queue: queue.to_string(),
                reason: "connection reset".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_publishes_collection_id() {
        let queue = Arc::new(MemoryQueue::new());
        let notifier = Notifier::new("aerial:job-queue").with_publisher(queue.clone());
        let collection = collection();

        notifier
            .collection_processed(&collection, CompletionEvent::processed(&collection, 2, 0, 0))
            .await;

        assert_eq!(
            queue.messages("aerial:job-queue").await,
            vec![b"artc_1".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_pushes_to_label_channel() {
        let notifier = Notifier::new("aerial:job-queue");
        let mut rx = notifier.channels().register("batch-7").await;
        let collection = collection();

        notifier
            .collection_processed(&collection, CompletionEvent::processed(&collection, 1, 0, 1))
            .await;

        let message = rx.recv().await.unwrap();
        let event: CompletionEvent = serde_json::from_str(&message).unwrap();
        assert_eq!(event, CompletionEvent::processed(&collection, 1, 0, 1));
        assert_eq!(event.event, "collection_processed");
    }

    #[tokio::test]
    async fn test_broker_failure_is_not_fatal() {
        let notifier = Notifier::new("aerial:job-queue").with_publisher(Arc::new(BrokenQueue));
        let mut rx = notifier.channels().register("batch-7").await;
        let collection = collection();

        notifier
            .collection_processed(&collection, CompletionEvent::processed(&collection, 0, 0, 0))
            .await;

        assert!(rx.recv().await.is_some());
    }
}
