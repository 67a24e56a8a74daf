use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, info_span, warn, Instrument};

use super::{record::QueueRecord, LocalQueue};
use crate::sender::OutboundSender;

const REDELIVERY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Delivered,
    /// Put back on the queue for another attempt
    Requeued,
    /// Given up on after too many attempts
    DeadLettered,
    /// The record can never be delivered
    Dropped,
}

/// Consumes the reply queue, one record per worker at a time.
///
/// Redelivery of failed sends lives here; the sender itself never retries.
pub struct QueueProcessor {
    queue: LocalQueue,
    sender: OutboundSender,
    max_receive_count: u32,
    redelivery_delay: Duration,
}
impl QueueProcessor {
    pub const fn new(queue: LocalQueue, sender: OutboundSender, max_receive_count: u32) -> Self {
        Self {
            queue,
            sender,
            max_receive_count,
            redelivery_delay: REDELIVERY_DELAY,
        }
    }

    #[must_use]
    pub const fn with_redelivery_delay(mut self, delay: Duration) -> Self {
        self.redelivery_delay = delay;
        self
    }

    pub async fn run(self, concurrency: u32) {
        info!(concurrency, "Starting reply sender");

        let this = Arc::new(self);
        let workers = (0..concurrency.max(1)).map(|worker| {
            let this = this.clone();

            tokio::task::spawn(
                async move { this.work().await }.instrument(info_span!("worker", id = worker)),
            )
        });

        for res in futures::future::join_all(workers).await {
            if let Err(e) = res {
                error!(?e, "Reply sender worker stopped");
            }
        }
    }

    async fn work(self: Arc<Self>) {
        loop {
            let record = self.queue.pop().await;
            let record_id = record.id().to_string();

            let this = self.clone();
            let res = tokio::task::spawn(
                async move { this.handle(record).await }.instrument(tracing::Span::current()),
            )
            .await;

            if let Err(e) = res {
                error!(?e, record = %record_id, "Error processing record");
            }
        }
    }

    pub async fn handle(&self, record: QueueRecord) -> RecordOutcome {
        let err = match self.sender.deliver(&record).await {
            Ok(_) => {
                if let Ok(took) = record.time_since_enqueued().to_std() {
                    debug!(record = %record.id(), "Record delivered after {:?}", took);
                }

                return RecordOutcome::Delivered;
            }

            Err(e) => e,
        };

        if !err.is_retryable() {
            error!(?err, record = %record.id(), body = record.body(), "Dropping record that can't be delivered");
            return RecordOutcome::Dropped;
        }

        if record.receive_count() >= self.max_receive_count {
            error!(?err, record = %record.id(), receive_count = record.receive_count(), body = record.body(), "Too many attempts, giving up on record");
            return RecordOutcome::DeadLettered;
        }

        warn!(?err, record = %record.id(), receive_count = record.receive_count(), "Failed to deliver record, will retry");
        self.redeliver(record);

        RecordOutcome::Requeued
    }

    fn redeliver(&self, record: QueueRecord) {
        let queue = self.queue.clone();
        let delay = self.redelivery_delay * record.receive_count();

        tokio::task::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.push(record);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::tests::FakeProvider;

    fn processor(provider: Arc<FakeProvider>, queue: &LocalQueue) -> QueueProcessor {
        QueueProcessor::new(queue.clone(), OutboundSender::new(provider), 3)
            .with_redelivery_delay(Duration::ZERO)
    }

    fn record() -> QueueRecord {
        QueueRecord::new(r#"{"chatId": 1, "text": "hi", "props": {}}"#.to_string())
    }

    #[tokio::test]
    async fn delivers_record() {
        let provider = Arc::new(FakeProvider::default());
        let queue = LocalQueue::new();

        let outcome = processor(provider.clone(), &queue)
            .handle(record().received())
            .await;

        assert_eq!(outcome, RecordOutcome::Delivered);
        assert_eq!(provider.sent().len(), 1);
    }

    #[tokio::test]
    async fn failed_send_is_redelivered_until_limit() {
        let provider = Arc::new(FakeProvider::failing(10));
        let queue = LocalQueue::new();
        let processor = processor(provider.clone(), &queue);

        queue.push(record());
        let mut outcomes = Vec::new();
        for _ in 0..3 {
            let record = tokio::time::timeout(Duration::from_secs(5), queue.pop())
                .await
                .expect("record redelivered");
            outcomes.push(processor.handle(record).await);
        }

        assert_eq!(
            outcomes,
            vec![
                RecordOutcome::Requeued,
                RecordOutcome::Requeued,
                RecordOutcome::DeadLettered
            ]
        );
        assert!(provider.sent().is_empty());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let provider = Arc::new(FakeProvider::failing(1));
        let queue = LocalQueue::new();
        let processor = processor(provider.clone(), &queue);

        queue.push(record());
        let first = processor.handle(queue.pop().await).await;
        let retried = tokio::time::timeout(Duration::from_secs(5), queue.pop())
            .await
            .expect("record redelivered");
        let second = processor.handle(retried).await;

        assert_eq!(first, RecordOutcome::Requeued);
        assert_eq!(second, RecordOutcome::Delivered);
        assert_eq!(provider.sent().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_record_is_dropped() {
        let provider = Arc::new(FakeProvider::default());
        let queue = LocalQueue::new();

        let outcome = processor(provider, &queue)
            .handle(QueueRecord::new("nope".to_string()).received())
            .await;

        assert_eq!(outcome, RecordOutcome::Dropped);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn workers_drain_the_queue() {
        let provider = Arc::new(FakeProvider::default());
        let queue = LocalQueue::new();
        for _ in 0..5 {
            queue.push(record());
        }

        tokio::task::spawn(processor(provider.clone(), &queue).run(2));

        tokio::time::timeout(Duration::from_secs(5), async {
            while provider.sent().len() < 5 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("all records delivered");
        assert!(queue.is_empty());
    }
}
