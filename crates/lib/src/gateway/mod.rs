//! Webhook endpoint: the HTTP surface Slack's Events API posts to.
//!
//! Single port. `GET /` is a liveness probe; `POST /` takes signed event
//! payloads, answers the URL-verification handshake and acks callback events
//! before they are normalized.

mod server;

pub use server::{router, run_gateway, serve, GatewayState};
