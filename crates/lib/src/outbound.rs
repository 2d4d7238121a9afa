//! Outbound dispatcher: envelope -> one `chat.postMessage` per text chunk.

use crate::envelope::{Envelope, MalformedEnvelope};
use crate::session::Session;
use crate::slack::SlackError;
use std::sync::Arc;

/// Default maximum code points per posted message.
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Malformed(#[from] MalformedEnvelope),
    #[error("delivering chunk {chunk} of {total} failed: {source}")]
    Delivery {
        /// 1-based index of the chunk that failed.
        chunk: usize,
        total: usize,
        #[source]
        source: SlackError,
    },
}

/// Split `text` into chunks of at most `size` code points.
///
/// A chunk is closed after every `size`-th code point and the remainder is always
/// appended, so the result has `len / size + 1` entries and ends with an empty
/// chunk when the length is an exact multiple of `size`.
pub fn split_text(text: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / size + 1);
    let mut buf = String::new();
    for (i, c) in text.chars().enumerate() {
        buf.push(c);
        if (i + 1) % size == 0 {
            chunks.push(std::mem::take(&mut buf));
        }
    }
    chunks.push(buf);
    chunks
}

#[derive(Clone)]
pub struct Dispatcher {
    session: Arc<Session>,
    chunk_size: usize,
}

impl Dispatcher {
    pub fn new(session: Arc<Session>, chunk_size: usize) -> Self {
        Self {
            session,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Post the envelope's text to its room.
    pub async fn send(&self, value: serde_json::Value) -> Result<(), DispatchError> {
        let envelope = coerce(value)?;
        self.send_envelope(&envelope).await
    }

    /// Post the envelope's text to its room, mentioning the original author on every chunk.
    pub async fn reply(&self, value: serde_json::Value) -> Result<(), DispatchError> {
        let envelope = coerce(value)?;
        self.reply_envelope(&envelope).await
    }

    pub async fn send_envelope(&self, envelope: &Envelope) -> Result<(), DispatchError> {
        envelope.validate().map_err(log_malformed)?;
        let chunks = split_text(&envelope.message.text, self.chunk_size);
        self.deliver(&envelope.room.id, chunks).await
    }

    pub async fn reply_envelope(&self, envelope: &Envelope) -> Result<(), DispatchError> {
        envelope.validate().map_err(log_malformed)?;
        let tag = envelope.mention_tag();
        let chunks = split_text(&envelope.message.text, self.chunk_size)
            .into_iter()
            .map(|c| format!("{} {}", tag, c))
            .collect();
        self.deliver(&envelope.room.id, chunks).await
    }

    /// Post chunks in order; the first failure stops the rest.
    async fn deliver(&self, channel: &str, chunks: Vec<String>) -> Result<(), DispatchError> {
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            if let Err(source) = self.session.client().post_message(channel, chunk).await {
                let err = DispatchError::Delivery {
                    chunk: i + 1,
                    total,
                    source,
                };
                log::warn!("post to {}: {}", channel, err);
                return Err(err);
            }
        }
        log::debug!("posted {} chunk(s) to {}", total, channel);
        Ok(())
    }
}

fn coerce(value: serde_json::Value) -> Result<Envelope, DispatchError> {
    Envelope::from_value(value).map_err(|e| log_malformed(e).into())
}

fn log_malformed(e: MalformedEnvelope) -> MalformedEnvelope {
    log::warn!("outbound message not sent: {}", e);
    e
}
