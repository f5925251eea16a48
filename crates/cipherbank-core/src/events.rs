//! Event feed shared by all components
//!
//! Events are broadcast to live subscribers and kept in a bounded history so
//! late observers can replay what happened.

use std::collections::VecDeque;
use std::sync::Arc;

use cipherbank_types::RegistryEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

/// Event feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBusConfig {
    /// Maximum events buffered per live subscriber
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Maximum events retained for replay
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_capacity() -> usize {
    1000
}

fn default_history_limit() -> usize {
    10000
}

/// Broadcast channel plus replay log
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RegistryEvent>,
    history: Arc<RwLock<VecDeque<RegistryEvent>>>,
    history_limit: usize,
}

impl EventBus {
    /// Create an event bus with the given configuration
    pub fn new(config: &EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity.max(1));
        Self {
            sender,
            history: Arc::new(RwLock::new(VecDeque::new())),
            history_limit: config.history_limit,
        }
    }

    /// Record and broadcast an event
    pub async fn emit(&self, event: RegistryEvent) {
        tracing::debug!(event = event.name(), summary = %event.summary(), "event emitted");

        let mut history = self.history.write().await;
        history.push_back(event.clone());
        while history.len() > self.history_limit {
            history.pop_front();
        }

        // Ignore send errors (no receivers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }

    /// All retained events, oldest first
    pub async fn history(&self) -> Vec<RegistryEvent> {
        self.history.read().await.iter().cloned().collect()
    }

    /// Most recently emitted event
    pub async fn last(&self) -> Option<RegistryEvent> {
        self.history.read().await.back().cloned()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(&EventBusConfig::default())
    }
}
