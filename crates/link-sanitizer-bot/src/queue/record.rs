/// A message sitting in the reply queue.
///
/// The body is the JSON encoded notification, exactly as it would travel over
/// an external queue.
#[derive(Clone, Debug)]
pub struct QueueRecord {
    id: String,
    body: String,
    receive_count: u32,
    enqueued_at: chrono::DateTime<chrono::Utc>,
}
impl QueueRecord {
    pub fn new(body: String) -> Self {
        let mut id = ulid::Ulid::new().to_string();
        id.make_ascii_lowercase();

        Self {
            id,
            body,
            receive_count: 0,
            enqueued_at: chrono::Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// How many times the record has been handed to a consumer.
    pub const fn receive_count(&self) -> u32 {
        self.receive_count
    }

    #[must_use]
    pub fn received(mut self) -> Self {
        self.receive_count += 1;
        self
    }

    pub fn time_since_enqueued(&self) -> chrono::Duration {
        chrono::Utc::now().signed_duration_since(self.enqueued_at)
    }
}
