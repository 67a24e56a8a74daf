use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use tracing::warn;

/// A single webhook delivery from Telegram.
///
/// Only the `message` field matters here, every other update kind is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<InboundMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: i32,

    pub chat: Chat,

    #[serde(default)]
    pub date: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Spans of interest within `text`
    ///
    /// A list that doesn't decode is dropped instead of rejecting the whole update.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub entities: Option<Vec<MessageEntity>>,

    /// Text attached to media messages, used when `text` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub caption_entities: Option<Vec<MessageEntity>>,
}
impl InboundMessage {
    /// The text of the message together with the entities annotating it.
    ///
    /// Falls back to the caption for media messages.
    #[must_use]
    pub fn annotated_text(&self) -> (Option<&str>, &[MessageEntity]) {
        if self.text.is_none() && self.caption.is_some() {
            return (
                self.caption.as_deref(),
                self.caption_entities.as_deref().unwrap_or_default(),
            );
        }

        (
            self.text.as_deref(),
            self.entities.as_deref().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// A span within a message's text.
///
/// `offset` and `length` are counted in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: i64,
    pub length: i64,
}
impl MessageEntity {
    pub fn new<S: Into<String>>(kind: S, offset: i64, length: i64) -> Self {
        Self {
            kind: kind.into(),
            offset,
            length,
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(value.and_then(|value| match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(?e, "Ignoring malformed entity list");
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_telegram_update() {
        let update: InboundUpdate = serde_json::from_str(
            r#"{
                "update_id": 10,
                "message": {
                    "message_id": 1,
                    "from": { "id": 7, "is_bot": false, "first_name": "Ana" },
                    "chat": { "id": 12345, "type": "private" },
                    "date": 123456789,
                    "text": "https://test.com?utm_source=tracking",
                    "entities": [{ "type": "url", "offset": 0, "length": 36 }]
                }
            }"#,
        )
        .expect("valid update");

        let message = update.message.expect("message present");
        assert_eq!(message.message_id, 1);
        assert_eq!(message.chat.id, 12345);
        assert_eq!(message.date, 123_456_789);
        assert_eq!(
            message.entities,
            Some(vec![MessageEntity::new("url", 0, 36)])
        );
    }

    #[test]
    fn update_without_message_decodes() {
        let update: InboundUpdate = serde_json::from_str("{}").expect("valid update");

        assert!(update.message.is_none());
    }

    #[test]
    fn malformed_entities_are_dropped() {
        let message: InboundMessage = serde_json::from_str(
            r#"{
                "message_id": 1,
                "chat": { "id": 1 },
                "text": "http://example.com",
                "entities": [{ "type": "url", "offset": "zero" }]
            }"#,
        )
        .expect("message still decodes");

        assert_eq!(message.entities, None);
        assert_eq!(message.text.as_deref(), Some("http://example.com"));
    }

    #[test]
    fn caption_used_when_text_missing() {
        let message: InboundMessage = serde_json::from_str(
            r#"{
                "message_id": 1,
                "chat": { "id": 1 },
                "caption": "http://example.com",
                "caption_entities": [{ "type": "url", "offset": 0, "length": 18 }]
            }"#,
        )
        .expect("valid message");

        let (text, entities) = message.annotated_text();
        assert_eq!(text, Some("http://example.com"));
        assert_eq!(entities, &[MessageEntity::new("url", 0, 18)]);
    }
}
