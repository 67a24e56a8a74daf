pub mod processor;
pub mod record;

use std::sync::Arc;

use app_sanitizer::{OutboundNotification, QueueTransport, TransportError};
use deadqueue::unlimited::Queue;
pub use processor::QueueProcessor;
use record::QueueRecord;
use tracing::{debug, trace};

/// In-process reply queue.
///
/// Cloning gives another handle to the same queue.
#[derive(Clone)]
pub struct LocalQueue {
    records: Arc<Queue<QueueRecord>>,
}
impl LocalQueue {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Queue::new()),
        }
    }

    pub fn push(&self, record: QueueRecord) {
        trace!(?record, "Pushing record to queue");
        self.records.push(record);
    }

    /// Wait for the next record and mark it as received.
    pub async fn pop(&self) -> QueueRecord {
        self.records.pop().await.received()
    }

    #[cfg(test)]
    pub fn try_pop(&self) -> Option<QueueRecord> {
        self.records.try_pop().map(QueueRecord::received)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl Default for LocalQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl QueueTransport for LocalQueue {
    async fn enqueue(&self, notification: &OutboundNotification) -> Result<(), TransportError> {
        let body = serde_json::to_string(notification)?;

        self.push(QueueRecord::new(body));
        debug!(queued = self.len(), "Enqueued reply");

        Ok(())
    }
}
