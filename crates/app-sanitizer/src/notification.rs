use serde::{Deserialize, Serialize};

use crate::message::InboundMessage;

pub const DEFAULT_SINGULAR_PREFIX: &str = "Ось лінк без трекінгу:";
pub const DEFAULT_PLURAL_PREFIX: &str = "Ось лінки без трекінгу:";

/// A reply waiting in the queue to be sent back to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundNotification {
    pub chat_id: i64,
    pub text: String,
    #[serde(default)]
    pub props: MessageProps,
}

/// Extra send options passed through to the messaging provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTemplates {
    pub singular_prefix: String,
    pub plural_prefix: String,
}
impl Default for ReplyTemplates {
    fn default() -> Self {
        Self {
            singular_prefix: DEFAULT_SINGULAR_PREFIX.to_string(),
            plural_prefix: DEFAULT_PLURAL_PREFIX.to_string(),
        }
    }
}
impl ReplyTemplates {
    pub fn new<S1: Into<String>, S2: Into<String>>(singular_prefix: S1, plural_prefix: S2) -> Self {
        Self {
            singular_prefix: singular_prefix.into(),
            plural_prefix: plural_prefix.into(),
        }
    }

    #[must_use]
    pub fn reply_text(&self, urls: &[String]) -> Option<String> {
        match urls {
            [] => None,
            [url] => Some(format!("{} {}", self.singular_prefix, url)),
            urls => Some(format!("{} {}", self.plural_prefix, urls.join(", "))),
        }
    }

    /// Build the threaded reply to `original` listing the cleaned links.
    #[must_use]
    pub fn notification_for(
        &self,
        original: &InboundMessage,
        urls: &[String],
    ) -> Option<OutboundNotification> {
        let text = self.reply_text(urls)?;

        Some(OutboundNotification {
            chat_id: original.chat.id,
            text,
            props: MessageProps {
                reply_to_message_id: Some(original.message_id),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::message::Chat;

    fn original() -> InboundMessage {
        InboundMessage {
            message_id: 2,
            chat: Chat { id: 1 },
            date: 0,
            text: None,
            entities: None,
            caption: None,
            caption_entities: None,
        }
    }

    #[test]
    fn single_url_uses_singular_form() {
        let notification = ReplyTemplates::default()
            .notification_for(&original(), &["http://example.com".to_string()])
            .expect("one url");

        assert_eq!(
            notification.text,
            "Ось лінк без трекінгу: http://example.com"
        );
        assert_eq!(notification.chat_id, 1);
        assert_eq!(notification.props.reply_to_message_id, Some(2));
    }

    #[test]
    fn multiple_urls_are_joined() {
        let urls = ["http://example.com".to_string(), "http://another.com".to_string()];
        let text = ReplyTemplates::default().reply_text(&urls);

        assert_eq!(
            text.as_deref(),
            Some("Ось лінки без трекінгу: http://example.com, http://another.com")
        );
    }

    #[test]
    fn no_urls_no_notification() {
        assert_eq!(ReplyTemplates::default().notification_for(&original(), &[]), None);
    }

    #[test]
    fn custom_prefixes() {
        let templates = ReplyTemplates::new("Clean link:", "Clean links:");

        assert_eq!(
            templates.reply_text(&["a".to_string()]).as_deref(),
            Some("Clean link: a")
        );
        assert_eq!(
            templates.reply_text(&["a".to_string(), "b".to_string()]).as_deref(),
            Some("Clean links: a, b")
        );
    }

    #[test]
    fn queue_wire_format() {
        let notification = ReplyTemplates::default()
            .notification_for(&original(), &["http://example.com".to_string()])
            .expect("one url");

        assert_eq!(
            serde_json::to_value(&notification).expect("serializable"),
            json!({
                "chatId": 1,
                "text": "Ось лінк без трекінгу: http://example.com",
                "props": { "reply_to_message_id": 2 }
            })
        );
    }

    #[test]
    fn empty_props_decode() {
        let notification: OutboundNotification =
            serde_json::from_str(r#"{"chatId": 123456, "text": "Test message", "props": {}}"#)
                .expect("valid body");

        assert_eq!(notification.props, MessageProps::default());
        assert_eq!(notification.text, "Test message");
    }
}
