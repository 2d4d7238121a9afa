//! Platform-neutral message envelope exchanged with the bot-logic consumer.
//!
//! The normalizer builds envelopes from Slack events; the outbound dispatcher
//! accepts the same shape (as a typed value or loose JSON) for send/reply.

use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Conversation the message belongs to. `id` is the Slack channel id and is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Channel topic.
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Slack message timestamp (`ts`).
    #[serde(default)]
    pub id: String,
    /// Trimmed message text; may be empty but is always present.
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Generic message record. Built once and handed over by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub user: User,
    pub room: Room,
    pub message: Message,
    #[serde(default)]
    pub is_reply: bool,
    #[serde(default)]
    pub channel_type: String,
    #[serde(default, alias = "thread_ts")]
    pub thread_id: String,
    /// The inbound event as received, for consumers that need platform details.
    #[serde(default)]
    pub raw: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum MalformedEnvelope {
    #[error("malformed envelope: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("malformed envelope: room.id is empty")]
    EmptyRoomId,
}

impl Envelope {
    /// Coerce a loosely-typed value (e.g. what a consumer hands back) into an envelope.
    /// `user`, `room` (with a non-empty `id`) and `message` (with a string `text`) are required.
    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedEnvelope> {
        let envelope: Envelope = serde_json::from_value(value)?;
        envelope.validate()?;
        Ok(envelope)
    }

    pub fn validate(&self) -> Result<(), MalformedEnvelope> {
        if self.room.id.trim().is_empty() {
            return Err(MalformedEnvelope::EmptyRoomId);
        }
        Ok(())
    }

    /// Slack mention tag for the envelope's author, e.g. `<@U123>`.
    pub fn mention_tag(&self) -> String {
        format!("<@{}>", self.user.id)
    }
}
