//! Message Bridge - remote-control endpoint on the cross-context channel
//!
//! Inbound: drop self-originated messages, latch the reply origin on first
//! contact, parse the command and dispatch it to the [`VideoController`].
//!
//! Outbound: [`Outbound`] posts events to the latched origin. Delivery
//! failures are logged and swallowed.

use crate::{
    channel::{InboundMessage, MessageChannel, MessageSource},
    controller::VideoController,
    origin::TrustedOrigin,
    protocol::{Command, CommandEnvelope, EventEnvelope, EventSink},
    task::LocalSpawner,
    Error,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

/// Outbound half: posts events to the trusted origin
#[derive(Clone)]
pub struct Outbound {
    channel: Rc<dyn MessageChannel>,
    origin: Rc<RefCell<TrustedOrigin>>,
}

impl Outbound {
    pub fn new(channel: Rc<dyn MessageChannel>) -> Self {
        Self {
            channel,
            origin: Rc::new(RefCell::new(TrustedOrigin::default())),
        }
    }

    /// Current reply target
    pub fn trusted_origin(&self) -> TrustedOrigin {
        self.origin.borrow().clone()
    }

    /// Latch the reply target. Returns true on the first call only.
    fn trust(&self, origin: &str) -> bool {
        self.origin.borrow_mut().lock(origin)
    }
}

impl EventSink for Outbound {
    fn emit(&self, event: EventEnvelope) {
        let target = self.origin.borrow().target().to_string();
        if let Err(err) = self.channel.post(&event, &target) {
            warn!(code = err.error_code(), error = %err, target = %target, "Unable to send the message");
        }
    }
}

/// Inbound half: command parsing and dispatch
pub struct MessageBridge {
    controller: VideoController,
    outbound: Outbound,
    spawner: Rc<dyn LocalSpawner>,
}

impl MessageBridge {
    pub fn new(controller: VideoController, outbound: Outbound, spawner: Rc<dyn LocalSpawner>) -> Self {
        Self {
            controller,
            outbound,
            spawner,
        }
    }

    /// Handle one message from the channel. Never fails.
    pub fn on_inbound_message(&self, message: InboundMessage) {
        if message.source == MessageSource::SelfContext {
            return;
        }

        if self.outbound.trust(&message.origin) {
            info!(origin = %message.origin, "Trusted origin locked");
        }

        let command = match Self::parse(message.data.as_deref()) {
            Ok(envelope) => envelope.into_command(),
            Err(err) => {
                warn!(code = err.error_code(), error = %err, origin = %message.origin, "Dropping inbound message");
                return;
            }
        };

        match command {
            Some(command) => self.dispatch(command),
            None => trace!("Ignoring unrecognized command"),
        }
    }

    /// Post an event to the embedding context
    pub fn emit_event(&self, event: EventEnvelope) {
        self.outbound.emit(event);
    }

    pub fn trusted_origin(&self) -> TrustedOrigin {
        self.outbound.trusted_origin()
    }

    pub fn controller(&self) -> &VideoController {
        &self.controller
    }

    fn parse(data: Option<&str>) -> crate::Result<CommandEnvelope> {
        let raw = data.ok_or(Error::MissingPayload)?;
        CommandEnvelope::parse(raw)
    }

    fn dispatch(&self, command: Command) {
        debug!(command = ?command, "Dispatching command");

        match command {
            Command::Play => self.spawner.spawn_local(self.controller.play()),
            Command::Pause => self.controller.pause(),
            Command::Stop => self.controller.stop(),
            Command::Mute => self.controller.mute(),
            Command::UnMute => self.controller.unmute(),
            Command::GetProperty { name, reply_type } => {
                let value = self.controller.get_property(&name);
                self.emit_event(EventEnvelope::property_reply(reply_type, value));
            }
            Command::SetProperty { name, value } => self.controller.set_property(&name, &value),
        }
    }
}
