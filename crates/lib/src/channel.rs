//! Event channel: process-wide queue of envelopes read by the bot-logic consumer.

use crate::envelope::Envelope;
use tokio::sync::mpsc;

/// Create the unbounded envelope queue. Senders may be cloned freely.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

/// Writing half; one clone per producer.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EventSender {
    /// Hand the envelope to the consumer. Returns false when the consumer has gone away.
    pub fn push(&self, envelope: Envelope) -> bool {
        if self.tx.send(envelope).is_err() {
            log::debug!("event channel closed, dropping envelope");
            return false;
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Reading half, owned by the single consumer.
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl EventReceiver {
    /// Next envelope in send order; None once every sender is dropped.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }
}
