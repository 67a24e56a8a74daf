/// Configuration the invocation can't run without.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: `{0}`")]
    Missing(&'static str),
    #[error("Invalid configuration for `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Failure of the queue or of the messaging provider.
///
/// Retrying is left to whoever owns the transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to encode queue message: `{0}`")]
    Encode(#[from] serde_json::Error),
    #[error("Queue unavailable: `{0}`")]
    QueueUnavailable(String),
    #[error("Provider request failed: `{0}`")]
    Provider(String),
}

/// Everything that fails a whole webhook invocation.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("Invalid webhook payload: `{0}`")]
    InvalidPayload(#[source] serde_json::Error),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
