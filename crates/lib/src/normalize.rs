//! Event normalizer: Slack `message` / `app_mention` events -> [`Envelope`].
//!
//! Each callback event is normalized on its own detached task; metadata lookups
//! are best-effort and their failures never reach the caller.

use crate::channel::EventSender;
use crate::envelope::{Attachment, Envelope, Message, Room, User};
use crate::session::Session;
use crate::slack::{AppMentionEvent, InboundEvent, MessageEvent};
use std::any::Any;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// `channel_type` given to envelopes built from mention events.
pub const MENTION_CHANNEL_TYPE: &str = "app_mention";

#[derive(Clone)]
pub struct Normalizer {
    session: Arc<Session>,
    events: EventSender,
}

impl Normalizer {
    pub fn new(session: Arc<Session>, events: EventSender) -> Self {
        Self { session, events }
    }

    /// Normalize on a detached task. Panics inside the task are logged, not propagated.
    pub fn dispatch(&self, event: InboundEvent, raw: serde_json::Value) -> JoinHandle<()> {
        let this = self.clone();
        let task = tokio::spawn(async move {
            this.process(event, raw).await;
        });
        tokio::spawn(async move {
            if let Err(e) = task.await {
                if e.is_panic() {
                    log::error!(
                        "event normalization task panicked: {}",
                        panic_message(e.into_panic())
                    );
                } else {
                    log::warn!("event normalization task cancelled");
                }
            }
        })
    }

    /// Normalize and push onto the event channel. Returns true if an envelope was enqueued.
    pub async fn process(&self, event: InboundEvent, raw: serde_json::Value) -> bool {
        match self.normalize(event, raw).await {
            Some(envelope) => self.events.push(envelope),
            None => false,
        }
    }

    /// Build the envelope for one event, or None when the event is suppressed.
    pub async fn normalize(&self, event: InboundEvent, raw: serde_json::Value) -> Option<Envelope> {
        match event {
            InboundEvent::PlainMessage(m) => self.on_message(m, raw).await,
            InboundEvent::Mention(m) => self.on_app_mention(m, raw).await,
            InboundEvent::Unknown(kind) => {
                log::debug!("ignoring callback event of type {:?}", kind);
                None
            }
        }
    }

    async fn on_message(&self, event: MessageEvent, raw: serde_json::Value) -> Option<Envelope> {
        if !self.accept(&event.user, &event.channel) {
            return None;
        }
        let attachments = event
            .files
            .into_iter()
            .map(|f| Attachment {
                url: f.url_private,
                description: f.title,
            })
            .collect();
        let room = self.resolve_room(&event.channel).await;
        Some(Envelope {
            user: User {
                id: event.user,
                name: event.username,
            },
            room,
            message: Message {
                id: event.ts,
                text: event.text.trim().to_string(),
                attachments,
            },
            is_reply: false,
            channel_type: event.channel_type,
            thread_id: event.thread_ts,
            raw,
        })
    }

    /// Mentions resolve the author's name but never carry attachments.
    async fn on_app_mention(
        &self,
        event: AppMentionEvent,
        raw: serde_json::Value,
    ) -> Option<Envelope> {
        if !self.accept(&event.user, &event.channel) {
            return None;
        }
        let room = self.resolve_room(&event.channel).await;
        let name = self.resolve_user_name(&event.user).await;
        Some(Envelope {
            user: User {
                id: event.user,
                name,
            },
            room,
            message: Message {
                id: event.ts,
                text: event.text.trim().to_string(),
                attachments: Vec::new(),
            },
            is_reply: false,
            channel_type: MENTION_CHANNEL_TYPE.to_string(),
            thread_id: event.thread_ts,
            raw,
        })
    }

    /// Self-message suppression and the non-empty room id rule.
    fn accept(&self, user: &str, channel: &str) -> bool {
        if self.session.is_self(user) {
            log::trace!("skipping own message in {}", channel);
            return false;
        }
        if channel.is_empty() {
            log::warn!("dropping event without a channel id (user {:?})", user);
            return false;
        }
        true
    }

    /// Channel name and topic; falls back to the raw id and an empty topic.
    async fn resolve_room(&self, channel: &str) -> Room {
        match self.session.client().conversation_info(channel).await {
            Ok(info) => Room {
                id: channel.to_string(),
                name: info.name,
                description: info.topic,
            },
            Err(e) => {
                log::debug!("conversations.info for {} failed: {}", channel, e);
                Room {
                    id: channel.to_string(),
                    name: channel.to_string(),
                    description: String::new(),
                }
            }
        }
    }

    async fn resolve_user_name(&self, user: &str) -> String {
        match self.session.client().user_info(user).await {
            Ok(info) => info.name,
            Err(e) => {
                log::debug!("users.info for {} failed: {}", user, e);
                String::new()
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
