//! Direct push channels keyed by collection label.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Registry of live listeners.
#[derive(Debug, Default)]
pub struct PushChannels {
    senders: RwLock<HashMap<String, UnboundedSender<String>>>,
}

impl PushChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen on `key`, replacing any previous listener.
    pub async fn register(&self, key: &str) -> UnboundedReceiver<String> {
        let (tx, rx) = unbounded_channel();
        self.senders.write().await.insert(key.to_string(), tx);
        rx
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.senders.write().await.remove(key).is_some()
    }

    /// Send `message` to the listener on `key`.
    ///
    /// Returns false if nobody is registered; a listener that has gone away
    /// is dropped from the registry.
    pub async fn push(&self, key: &str, message: String) -> bool {
        let delivered = match self.senders.read().await.get(key) {
            Some(tx) => tx.send(message).is_ok(),
            None => return false,
        };

        if !delivered {
            self.senders.write().await.remove(key);
        }
        delivered
    }

    pub async fn len(&self) -> usize {
        self.senders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.senders.read().await.is_empty()
    }
}
