//! slackbridge — Slack Events API adapter.
//!
//! Verifies webhook requests, normalizes `message` / `app_mention` events into
//! platform-neutral [`envelope::Envelope`]s on an in-process event channel, and
//! posts envelopes back to Slack in size-bounded chunks.

pub mod adapter;
pub mod channel;
pub mod config;
pub mod envelope;
pub mod gateway;
pub mod normalize;
pub mod outbound;
pub mod session;
pub mod slack;

pub use adapter::Adapter;
pub use envelope::Envelope;
