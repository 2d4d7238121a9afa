//! Events API payloads, decoded once at the HTTP boundary.

use serde::Deserialize;

/// Outer webhook body, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebhookPayload {
    /// One-time handshake when the request URL is configured.
    UrlVerification { challenge: String },
    /// A real user action; `event` is kept raw so the envelope can carry it.
    EventCallback { event: serde_json::Value },
    #[serde(other)]
    Unsupported,
}

/// Inner callback event kinds the adapter understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    PlainMessage(MessageEvent),
    Mention(AppMentionEvent),
    /// Any other inner event type; acknowledged and ignored.
    Unknown(String),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TaggedEvent {
    #[serde(rename = "message")]
    Message(MessageEvent),
    #[serde(rename = "app_mention")]
    AppMention(AppMentionEvent),
}

impl InboundEvent {
    /// Decode the inner `event` object of an `event_callback`.
    pub fn decode(raw: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let kind = raw.get("type").and_then(|v| v.as_str()).unwrap_or_default();
        match kind {
            "message" | "app_mention" => Ok(match TaggedEvent::deserialize(raw)? {
                TaggedEvent::Message(m) => InboundEvent::PlainMessage(m),
                TaggedEvent::AppMention(m) => InboundEvent::Mention(m),
            }),
            other => Ok(InboundEvent::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub channel_type: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub thread_ts: String,
    #[serde(default)]
    pub files: Vec<SlackFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppMentionEvent {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub thread_ts: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SlackFile {
    #[serde(default)]
    pub url_private: String,
    #[serde(default)]
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_url_verification() {
        let p: WebhookPayload = serde_json::from_str(
            r#"{"token":"t","challenge":"abc123","type":"url_verification"}"#,
        )
        .unwrap();
        assert!(matches!(p, WebhookPayload::UrlVerification { challenge } if challenge == "abc123"));
    }

    #[test]
    fn unknown_outer_type_is_unsupported() {
        let p: WebhookPayload =
            serde_json::from_str(r#"{"type":"app_rate_limited","minute_rate_limited":1}"#).unwrap();
        assert!(matches!(p, WebhookPayload::Unsupported));
    }

    #[test]
    fn missing_type_is_an_error() {
        assert!(serde_json::from_str::<WebhookPayload>(r#"{"challenge":"x"}"#).is_err());
        assert!(serde_json::from_str::<WebhookPayload>("not json").is_err());
    }

    #[test]
    fn decodes_message_with_files() {
        let raw = json!({
            "type": "message",
            "channel": "C1",
            "channel_type": "channel",
            "user": "U1",
            "text": " hello ",
            "ts": "1.0",
            "files": [{ "url_private": "https://files/x", "title": "x.png", "id": "F1" }]
        });
        let InboundEvent::PlainMessage(m) = InboundEvent::decode(&raw).unwrap() else {
            panic!("expected a plain message");
        };
        assert_eq!(m.channel, "C1");
        assert_eq!(m.thread_ts, "");
        assert_eq!(m.files[0].title, "x.png");
    }

    #[test]
    fn decodes_app_mention_and_unknown() {
        let raw = json!({ "type": "app_mention", "channel": "C1", "user": "U1", "text": "<@B> hi", "ts": "2.0" });
        assert!(matches!(InboundEvent::decode(&raw).unwrap(), InboundEvent::Mention(_)));

        let raw = json!({ "type": "reaction_added", "user": "U1" });
        assert_eq!(
            InboundEvent::decode(&raw).unwrap(),
            InboundEvent::Unknown("reaction_added".to_string())
        );
    }

    #[test]
    fn rejects_ill_typed_message() {
        let raw = json!({ "type": "message", "channel": 7 });
        assert!(InboundEvent::decode(&raw).is_err());
    }
}
