//! In-process message bus between channels and the supervising agent.
//!
//! Subagents never talk to users directly: they publish an [`InboundMessage`]
//! on the `system` channel and the supervising agent picks it up like any
//! other incoming message.

use tokio::sync::{mpsc, Mutex};

/// A message entering the supervising agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub channel: String,
    pub sender_id: String,
    pub chat_id: String,
    pub content: String,
}

/// Unbounded inbound queue; publishing never waits on a consumer.
pub struct MessageBus {
    inbound_tx: mpsc::UnboundedSender<InboundMessage>,
    inbound_rx: Mutex<mpsc::UnboundedReceiver<InboundMessage>>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
        }
    }

    /// Queue a message for the supervising agent.
    pub async fn publish_inbound(&self, msg: InboundMessage) {
        tracing::debug!(channel = %msg.channel, chat_id = %msg.chat_id, "publishing inbound message");
        if self.inbound_tx.send(msg).is_err() {
            // Receiver lives in `self`, so this only happens mid-teardown.
            tracing::warn!("inbound queue closed, message dropped");
        }
    }

    /// Wait for the next inbound message.
    pub async fn consume_inbound(&self) -> Option<InboundMessage> {
        self.inbound_rx.lock().await.recv().await
    }

    /// Take the next inbound message if one is already queued.
    pub async fn try_consume_inbound(&self) -> Option<InboundMessage> {
        self.inbound_rx.lock().await.try_recv().ok()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
