//! Authenticated platform session: the Slack client plus the bot's own identity.
//!
//! Established once at startup and shared read-only (`Arc<Session>`) by the
//! webhook endpoint, the normalizer tasks and the outbound dispatcher.

use crate::slack::{BotIdentity, PlatformClient};
use anyhow::{Context, Result};
use std::sync::Arc;

pub struct Session {
    client: Arc<dyn PlatformClient>,
    bot: BotIdentity,
}

impl Session {
    /// Run `auth.test` to learn who we are, then mark the bot as active.
    /// Identity lookup failure is fatal; presence failure is only logged.
    pub async fn establish(client: Arc<dyn PlatformClient>) -> Result<Self> {
        let bot = client
            .auth_test()
            .await
            .context("slack auth.test failed")?;
        log::info!(
            "bot user: {} ({}) in team {} ({})",
            bot.user,
            bot.user_id,
            bot.team,
            bot.team_id
        );
        match client.set_presence("active").await {
            Ok(()) => log::info!("bot presence set to active"),
            Err(e) => log::warn!("setting bot presence failed: {}", e),
        }
        Ok(Self { client, bot })
    }

    /// Build a session from an already-known identity (no network calls).
    pub fn new(client: Arc<dyn PlatformClient>, bot: BotIdentity) -> Self {
        Self { client, bot }
    }

    pub fn client(&self) -> &dyn PlatformClient {
        self.client.as_ref()
    }

    pub fn bot(&self) -> &BotIdentity {
        &self.bot
    }

    /// True if `user_id` is the bot account itself.
    pub fn is_self(&self, user_id: &str) -> bool {
        !self.bot.user_id.is_empty() && user_id == self.bot.user_id
    }
}
