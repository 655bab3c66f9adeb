//! AMQP broker publisher.

use std::collections::HashSet;

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::{AMQPValue, FieldTable, LongString, ShortString};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{QueuePublisher, Result};
use crate::error::NotifyError;

/// Publishes to durable quorum queues through the default exchange.
pub struct AmqpPublisher {
    _connection: Connection,
    channel: Channel,
    declared: Mutex<HashSet<String>>,
}

impl AmqpPublisher {
    /// Connect to the broker at `url` and open a channel.
    pub async fn connect(url: &str) -> Result<Self> {
        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| NotifyError::Connect(e.to_string()))?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| NotifyError::Connect(e.to_string()))?;

        info!("Connected to AMQP broker");
        Ok(Self {
            _connection: connection,
            channel,
            declared: Mutex::new(HashSet::new()),
        })
    }

    async fn declare(&self, queue: &str) -> Result<()> {
        let mut declared = self.declared.lock().await;
        if declared.contains(queue) {
            return Ok(());
        }

        let mut arguments = FieldTable::default();
        arguments.insert(
            ShortString::from("x-queue-type"),
            AMQPValue::LongString(LongString::from("quorum")),
        );
        self.channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                arguments,
            )
            .await
            .map_err(|e| publish_error(queue, e))?;

        debug!("Declared quorum queue {}", queue);
        declared.insert(queue.to_string());
        Ok(())
    }
}

#[async_trait]
impl QueuePublisher for AmqpPublisher {
    async fn send_to_queue(&self, queue: &str, payload: &[u8]) -> Result<()> {
        self.declare(queue).await?;

        self.channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default(),
            )
            .await
            .map_err(|e| publish_error(queue, e))?
            .await
            .map_err(|e| publish_error(queue, e))?;
        Ok(())
    }
}

fn publish_error(queue: &str, error: lapin::Error) -> NotifyError {
    NotifyError::Publish {
        queue: queue.to_string(),
        reason: error.to_string(),
    }
}
