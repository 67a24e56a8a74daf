use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    blacklist::ParameterBlacklist,
    entities::urls_in_message,
    error::TransportError,
    message::InboundMessage,
    notification::{OutboundNotification, ReplyTemplates},
    query::{remove_tracking, SanitizeError, Sanitized},
};

/// Where outbound notifications are handed off for delivery.
#[async_trait::async_trait]
pub trait QueueTransport: Send + Sync {
    async fn enqueue(&self, notification: &OutboundNotification) -> Result<(), TransportError>;
}

/// What happened to a single extracted URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlReport {
    pub url: String,
    pub result: Result<Sanitized, SanitizeError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The message doesn't contain any links
    NoUrls,
    /// Links were found but none of them needed cleaning
    NothingToClean { reports: Vec<UrlReport> },
    /// A reply with the cleaned links should be sent
    Notify {
        notification: OutboundNotification,
        reports: Vec<UrlReport>,
    },
}
impl Decision {
    #[must_use]
    pub const fn notification(&self) -> Option<&OutboundNotification> {
        match self {
            Self::Notify { notification, .. } => Some(notification),
            _ => None,
        }
    }
}

/// Work out whether `msg` warrants a reply, and with what.
///
/// Pure: links that fail to parse are reported and skipped, nothing is sent.
pub fn decide(
    msg: &InboundMessage,
    blacklist: &ParameterBlacklist,
    templates: &ReplyTemplates,
) -> Decision {
    let urls = urls_in_message(msg);
    if urls.is_empty() {
        return Decision::NoUrls;
    }

    let reports = urls
        .into_iter()
        .map(|url| {
            let result = remove_tracking(&url, blacklist);
            if let Err(e) = &result {
                warn!(err = %e, "Skipping url");
            }

            UrlReport { url, result }
        })
        .collect::<Vec<_>>();

    let cleaned = reports
        .iter()
        .filter_map(|x| match &x.result {
            Ok(Sanitized::Rewritten(url)) => Some(url.clone()),
            _ => None,
        })
        .collect::<Vec<_>>();

    match templates.notification_for(msg, &cleaned) {
        Some(notification) => Decision::Notify {
            notification,
            reports,
        },
        None => Decision::NothingToClean { reports },
    }
}

/// Handles one inbound message: decide, then enqueue the reply if there is one.
pub struct MessageProcessor {
    queue: Arc<dyn QueueTransport>,
    templates: ReplyTemplates,
}
impl MessageProcessor {
    pub fn new(queue: Arc<dyn QueueTransport>, templates: ReplyTemplates) -> Self {
        Self { queue, templates }
    }

    #[tracing::instrument(name = "process", skip_all, fields(chat = %msg.chat.id, msg_id = %msg.message_id))]
    pub async fn process(
        &self,
        msg: &InboundMessage,
        blacklist: &ParameterBlacklist,
    ) -> Result<Decision, TransportError> {
        let decision = decide(msg, blacklist, &self.templates);

        match &decision {
            Decision::NoUrls => {
                info!("Message does not contain a URL");
            }
            Decision::NothingToClean { reports } => {
                info!(checked = reports.len(), "URLs do not need cleaning");
            }
            Decision::Notify {
                notification,
                reports,
            } => {
                debug!(?reports, "Cleaned URLs");
                info!("Sending cleaned URLs");
                self.queue.enqueue(notification).await?;
            }
        }

        Ok(decision)
    }
}

impl std::fmt::Debug for MessageProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageProcessor")
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::message::{Chat, MessageEntity};

    #[derive(Default)]
    struct RecordingQueue {
        sent: Mutex<Vec<OutboundNotification>>,
    }
    #[async_trait::async_trait]
    impl QueueTransport for RecordingQueue {
        async fn enqueue(&self, notification: &OutboundNotification) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct BrokenQueue;
    #[async_trait::async_trait]
    impl QueueTransport for BrokenQueue {
        async fn enqueue(&self, _: &OutboundNotification) -> Result<(), TransportError> {
            Err(TransportError::QueueUnavailable("closed".to_string()))
        }
    }

    fn blacklist() -> ParameterBlacklist {
        ParameterBlacklist::new(["utm_source", "utm_medium", "utm_campaign"])
    }

    fn message_with_urls(urls: &[&str]) -> InboundMessage {
        let mut text = String::new();
        let mut entities = Vec::new();
        for url in urls {
            if !text.is_empty() {
                text.push(' ');
            }
            let offset = text.encode_utf16().count();
            text.push_str(url);
            entities.push(MessageEntity::new(
                "url",
                i64::try_from(offset).unwrap(),
                i64::try_from(url.encode_utf16().count()).unwrap(),
            ));
        }

        InboundMessage {
            message_id: 1,
            chat: Chat { id: 12345 },
            date: 123_456_789,
            text: Some(text),
            entities: Some(entities),
            caption: None,
            caption_entities: None,
        }
    }

    #[test]
    fn no_urls_decision() {
        let msg = message_with_urls(&[]);

        assert_eq!(
            decide(&msg, &blacklist(), &ReplyTemplates::default()),
            Decision::NoUrls
        );
    }

    #[test]
    fn clean_urls_need_no_reply() {
        let msg = message_with_urls(&["https://test.com?foo=1", "https://test.com/"]);

        let decision = decide(&msg, &blacklist(), &ReplyTemplates::default());

        match decision {
            Decision::NothingToClean { reports } => {
                assert_eq!(reports.len(), 2);
                assert!(reports.iter().all(|x| x.result == Ok(Sanitized::Unchanged)));
            }
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn only_rewritten_urls_are_sent() {
        let msg = message_with_urls(&[
            "https://a.test/?utm_source=x",
            "https://b.test/?keep=1",
            "http://exa mple.com/?utm_source=x",
            "https://c.test/?utm_medium=y&id=3",
        ]);

        let decision = decide(&msg, &blacklist(), &ReplyTemplates::new("One:", "Many:"));

        let Decision::Notify {
            notification,
            reports,
        } = decision
        else {
            panic!("expected a notification");
        };

        assert_eq!(notification.text, "Many: https://a.test/, https://c.test/?id=3");
        assert_eq!(notification.chat_id, 12345);
        assert_eq!(notification.props.reply_to_message_id, Some(1));
        assert_eq!(reports.len(), 4);
        assert!(matches!(
            reports[2].result,
            Err(SanitizeError::MalformedUrl { .. })
        ));
    }

    #[tokio::test]
    async fn enqueues_exactly_one_notification() {
        let queue = Arc::new(RecordingQueue::default());
        let processor = MessageProcessor::new(queue.clone(), ReplyTemplates::default());
        let msg = message_with_urls(&["https://test.com?utm_source=tracking"]);

        let decision = processor.process(&msg, &blacklist()).await.expect("enqueued");

        let sent = queue.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "Ось лінк без трекінгу: https://test.com");
        assert_eq!(decision.notification(), Some(&sent[0]));
    }

    #[tokio::test]
    async fn nothing_enqueued_without_changes() {
        let queue = Arc::new(RecordingQueue::default());
        let processor = MessageProcessor::new(queue.clone(), ReplyTemplates::default());

        for msg in [
            message_with_urls(&[]),
            message_with_urls(&["https://test.com?foo=1"]),
            message_with_urls(&["not a url"]),
        ] {
            processor.process(&msg, &blacklist()).await.expect("no error");
        }

        assert!(queue.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn queue_failure_propagates() {
        let processor = MessageProcessor::new(Arc::new(BrokenQueue), ReplyTemplates::default());
        let msg = message_with_urls(&["https://test.com?utm_source=tracking"]);

        let res = processor.process(&msg, &blacklist()).await;

        assert!(matches!(res, Err(TransportError::QueueUnavailable(_))));
    }
}
