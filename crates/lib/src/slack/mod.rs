//! Slack platform plumbing: Web API client, request signing and Events API payloads.
//!
//! The rest of the crate talks to Slack only through [`PlatformClient`], so the
//! normalizer and dispatcher can run against an in-memory client in tests.

mod api;
pub mod events;
#[cfg(test)]
pub(crate) mod fake;
pub mod signature;

use async_trait::async_trait;

pub use api::{SlackClient, SlackError, DEFAULT_API_BASE};
pub use events::{AppMentionEvent, InboundEvent, MessageEvent, SlackFile, WebhookPayload};
pub use signature::{verify_request, SignatureError};

/// Identity of the bot account, as returned by `auth.test`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_id: String,
    pub user: String,
    pub team_id: String,
    pub team: String,
    pub bot_id: String,
}

/// Channel metadata used to fill in the envelope's room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomInfo {
    pub name: String,
    pub topic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
}

/// Calls the adapter makes against the chat platform.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Resolve the identity behind the access token.
    async fn auth_test(&self) -> Result<BotIdentity, SlackError>;
    /// Set the bot's presence ("active" or "away").
    async fn set_presence(&self, presence: &str) -> Result<(), SlackError>;
    async fn conversation_info(&self, channel: &str) -> Result<RoomInfo, SlackError>;
    async fn user_info(&self, user: &str) -> Result<UserInfo, SlackError>;
    /// Post a plain-text message to a channel.
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError>;
}
