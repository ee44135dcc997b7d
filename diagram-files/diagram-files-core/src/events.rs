use serde::Serialize;
use tokio::sync::broadcast;

/// Change notifications emitted by the file manager after an operation
/// completes successfully.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum FileEvent {
    Listed { count: usize },
    Loaded { name: String },
    Saved { name: String },
    Deleted { name: String },
    Renamed { from: Option<String>, to: String },
    Imported { name: String },
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FileEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileEvent> {
        self.tx.subscribe()
    }

    pub fn send(&self, event: FileEvent) {
        // no subscribers is fine
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
