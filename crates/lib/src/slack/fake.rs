//! In-memory [`PlatformClient`] for unit tests.

use crate::slack::{BotIdentity, PlatformClient, RoomInfo, SlackError, UserInfo};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct FakeClient {
    pub rooms: HashMap<String, RoomInfo>,
    pub users: HashMap<String, UserInfo>,
    /// (channel, text) per successful post_message, in call order.
    pub posted: Mutex<Vec<(String, String)>>,
    /// Number of post_message calls attempted.
    pub attempts: Mutex<usize>,
    /// 1-based post_message call that fails.
    pub fail_post_at: Option<usize>,
    pub panic_on_lookup: bool,
}

impl FakeClient {
    pub fn bot() -> BotIdentity {
        BotIdentity {
            user_id: "UBOT".to_string(),
            user: "lxbot".to_string(),
            team_id: "T1".to_string(),
            team: "acme".to_string(),
            bot_id: "B1".to_string(),
        }
    }

    pub fn posted(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl PlatformClient for FakeClient {
    async fn auth_test(&self) -> Result<BotIdentity, SlackError> {
        Ok(Self::bot())
    }

    async fn set_presence(&self, _presence: &str) -> Result<(), SlackError> {
        Ok(())
    }

    async fn conversation_info(&self, channel: &str) -> Result<RoomInfo, SlackError> {
        if self.panic_on_lookup {
            panic!("lookup exploded");
        }
        self.rooms
            .get(channel)
            .cloned()
            .ok_or_else(|| SlackError::Api("channel_not_found".to_string()))
    }

    async fn user_info(&self, user: &str) -> Result<UserInfo, SlackError> {
        self.users
            .get(user)
            .cloned()
            .ok_or_else(|| SlackError::Api("user_not_found".to_string()))
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        let n = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        if self.fail_post_at == Some(n) {
            return Err(SlackError::Api(format!("post {} failed", n)));
        }
        self.posted
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}
