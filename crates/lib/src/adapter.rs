//! The adapter context: one value owning the session, the normalizer and the
//! dispatcher, built at startup and passed to the webhook server and the consumer.

use crate::channel::{event_channel, EventReceiver};
use crate::config::{Config, Credentials};
use crate::envelope::Envelope;
use crate::gateway::{self, GatewayState};
use crate::normalize::Normalizer;
use crate::outbound::{DispatchError, Dispatcher};
use crate::session::Session;
use crate::slack::{PlatformClient, SlackClient};
use anyhow::Result;
use std::sync::Arc;

pub struct Adapter {
    config: Config,
    signing_secret: Arc<str>,
    session: Arc<Session>,
    normalizer: Normalizer,
    dispatcher: Dispatcher,
}

impl Adapter {
    /// Connect to Slack with the given credentials. Returns the adapter and the
    /// receiving end of the event channel for the bot-logic consumer.
    pub async fn boot(config: Config, credentials: Credentials) -> Result<(Self, EventReceiver)> {
        let client = Arc::new(SlackClient::new(
            credentials.access_token,
            Some(config.slack.api_base.clone()),
        ));
        Self::with_client(config, &credentials.signing_secret, client).await
    }

    /// Like [`Adapter::boot`] with any platform client.
    pub async fn with_client(
        config: Config,
        signing_secret: &str,
        client: Arc<dyn PlatformClient>,
    ) -> Result<(Self, EventReceiver)> {
        let session = Arc::new(Session::establish(client).await?);
        Ok(Self::from_session(config, signing_secret, session))
    }

    /// Wire an adapter around an established session.
    pub fn from_session(
        config: Config,
        signing_secret: &str,
        session: Arc<Session>,
    ) -> (Self, EventReceiver) {
        let (events, receiver) = event_channel();
        let normalizer = Normalizer::new(session.clone(), events);
        let dispatcher = Dispatcher::new(session.clone(), config.slack.chunk_size);
        let adapter = Self {
            config,
            signing_secret: Arc::from(signing_secret),
            session,
            normalizer,
            dispatcher,
        };
        (adapter, receiver)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// State for the webhook router.
    pub fn gateway_state(&self) -> GatewayState {
        GatewayState {
            signing_secret: self.signing_secret.clone(),
            replay_window_secs: self.config.slack.replay_window_secs,
            normalizer: self.normalizer.clone(),
        }
    }

    /// Post a loosely-typed envelope's text to its room.
    pub async fn send(&self, value: serde_json::Value) -> Result<(), DispatchError> {
        self.dispatcher.send(value).await
    }

    /// Post a loosely-typed envelope's text to its room, mentioning its author.
    pub async fn reply(&self, value: serde_json::Value) -> Result<(), DispatchError> {
        self.dispatcher.reply(value).await
    }

    pub async fn send_envelope(&self, envelope: &Envelope) -> Result<(), DispatchError> {
        self.dispatcher.send_envelope(envelope).await
    }

    pub async fn reply_envelope(&self, envelope: &Envelope) -> Result<(), DispatchError> {
        self.dispatcher.reply_envelope(envelope).await
    }

    /// Serve the webhook endpoint until shutdown.
    pub async fn run(&self) -> Result<()> {
        gateway::run_gateway(&self.config.gateway, self.gateway_state()).await
    }
}
