pub mod blacklist;
pub mod entities;
pub mod error;
pub mod message;
pub mod notification;
pub mod processor;
pub mod query;

pub use blacklist::ParameterBlacklist;
pub use entities::urls_in_message;
pub use error::{ConfigError, InvocationError, TransportError};
pub use message::{InboundMessage, InboundUpdate};
pub use notification::{MessageProps, OutboundNotification, ReplyTemplates};
pub use processor::{decide, Decision, MessageProcessor, QueueTransport, UrlReport};
pub use query::{remove_tracking, SanitizeError, Sanitized};
