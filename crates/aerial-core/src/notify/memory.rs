//! Publisher that keeps messages in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{QueuePublisher, Result};

/// Records every published message, per queue.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    messages: Mutex<HashMap<String, Vec<Vec<u8>>>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages published to `queue`, oldest first.
    pub async fn messages(&self, queue: &str) -> Vec<Vec<u8>> {
        self.messages
            .lock()
            .await
            .get(queue)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueuePublisher for MemoryQueue {
    async fn send_to_queue(&self, queue: &str, payload: &[u8]) -> Result<()> {
        self.messages
            .lock()
            .await
            .entry(queue.to_string())
            .or_default()
            .push(payload.to_vec());
        Ok(())
    }
}
