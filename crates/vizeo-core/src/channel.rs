//! Cross-context messaging channel abstraction

use crate::{protocol::EventEnvelope, Result};
use std::rc::Rc;

/// Where an inbound message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    /// Posted by this very execution context (echo on a shared channel)
    SelfContext,
    /// Posted by another context, typically the embedding page
    External,
}

/// A message as delivered by the channel
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub source: MessageSource,
    /// Sender origin, e.g. `https://host.example`
    pub origin: String,
    /// Text payload. `None` when the sender posted a non-text value.
    pub data: Option<String>,
}

impl InboundMessage {
    /// External text message
    pub fn external(origin: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            source: MessageSource::External,
            origin: origin.into(),
            data: Some(data.into()),
        }
    }
}

/// Handler invoked for every inbound message
pub type InboundHandler = Rc<dyn Fn(InboundMessage)>;

/// Identifies a channel subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Bidirectional channel to the embedding context.
///
/// Subscriptions are scoped: whoever subscribes is responsible for
/// unsubscribing when it goes away.
pub trait MessageChannel {
    /// Register `handler` for inbound messages
    fn subscribe(&self, handler: InboundHandler) -> Result<SubscriptionId>;

    /// Remove a handler registered with [`MessageChannel::subscribe`]
    fn unsubscribe(&self, id: SubscriptionId);

    /// Post a structured event to `target_origin` (`"*"` for any)
    fn post(&self, event: &EventEnvelope, target_origin: &str) -> Result<()>;
}
