//! Slack Web API client (https://slack.com/api by default).

use crate::slack::{BotIdentity, PlatformClient, RoomInfo, UserInfo};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("slack request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("slack api error: {0}")]
    Api(String),
}

/// Every Web API response carries `ok` and, when false, an `error` code.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    user: String,
    #[serde(default)]
    team_id: String,
    #[serde(default)]
    team: String,
    #[serde(default)]
    bot_id: String,
}

#[derive(Debug, Deserialize)]
struct ConversationInfoResponse {
    channel: ChannelObject,
}

#[derive(Debug, Deserialize)]
struct ChannelObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    topic: Option<Topic>,
}

#[derive(Debug, Deserialize)]
struct Topic {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    user: UserObject,
}

#[derive(Debug, Deserialize)]
struct UserObject {
    #[serde(default)]
    name: String,
}

/// Empty payload for methods whose response we only check for `ok`.
#[derive(Debug, Deserialize)]
struct Ack {}

/// Authenticated Slack Web API client. Cheap to clone.
#[derive(Clone)]
pub struct SlackClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl SlackClient {
    pub fn new(token: impl Into<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            base_url,
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET {base}/{method} with query parameters.
    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SlackError> {
        let url = format!("{}/{}", self.base_url, method);
        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        Self::read(method, res).await
    }

    /// POST {base}/{method} with a JSON body.
    async fn post<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, SlackError> {
        let url = format!("{}/{}", self.base_url, method);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::read(method, res).await
    }

    async fn read<T: DeserializeOwned>(method: &str, res: reqwest::Response) -> Result<T, SlackError> {
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SlackError::Api(format!("{} failed: {} {}", method, status, body)));
        }
        let data: ApiEnvelope<T> = res.json().await?;
        if !data.ok {
            return Err(SlackError::Api(format!(
                "{}: {}",
                method,
                data.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        data.data
            .ok_or_else(|| SlackError::Api(format!("{}: unexpected response shape", method)))
    }
}

#[async_trait]
impl PlatformClient for SlackClient {
    async fn auth_test(&self) -> Result<BotIdentity, SlackError> {
        let r: AuthTestResponse = self.post("auth.test", &serde_json::json!({})).await?;
        Ok(BotIdentity {
            user_id: r.user_id,
            user: r.user,
            team_id: r.team_id,
            team: r.team,
            bot_id: r.bot_id,
        })
    }

    async fn set_presence(&self, presence: &str) -> Result<(), SlackError> {
        let body = serde_json::json!({ "presence": presence });
        let _: Ack = self.post("users.setPresence", &body).await?;
        Ok(())
    }

    async fn conversation_info(&self, channel: &str) -> Result<RoomInfo, SlackError> {
        let r: ConversationInfoResponse =
            self.get("conversations.info", &[("channel", channel)]).await?;
        Ok(RoomInfo {
            name: r.channel.name,
            topic: r.channel.topic.map(|t| t.value).unwrap_or_default(),
        })
    }

    async fn user_info(&self, user: &str) -> Result<UserInfo, SlackError> {
        let r: UserInfoResponse = self.get("users.info", &[("user", user)]).await?;
        Ok(UserInfo { name: r.user.name })
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        let body = serde_json::json!({ "channel": channel, "text": text });
        let _: Ack = self.post("chat.postMessage", &body).await?;
        Ok(())
    }
}
