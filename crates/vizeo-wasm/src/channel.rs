//! `window` message events in, `window.parent.postMessage` out

use crate::describe;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use vizeo_core::{
    Error, EventEnvelope, InboundHandler, InboundMessage, MessageChannel, MessageSource, Result,
    SubscriptionId,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, Window};

type MessageListener = Closure<dyn FnMut(MessageEvent)>;

/// Channel between the player frame and its parent window
pub struct WindowChannel {
    window: Window,
    listeners: RefCell<HashMap<SubscriptionId, MessageListener>>,
    next_id: Cell<u64>,
}

impl WindowChannel {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }
}

impl MessageChannel for WindowChannel {
    fn subscribe(&self, handler: InboundHandler) -> Result<SubscriptionId> {
        let window = self.window.clone();
        let closure = MessageListener::new(move |event: MessageEvent| {
            let source = match event.source() {
                Some(source) if js_sys::Object::is(&source, &window) => {
                    MessageSource::SelfContext
                }
                _ => MessageSource::External,
            };

            handler(InboundMessage {
                source,
                origin: event.origin(),
                data: event.data().as_string(),
            });
        });

        self.window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .map_err(|err| Error::Listener(describe(&err)))?;

        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, closure);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let Some(closure) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };

        if let Err(err) = self
            .window
            .remove_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            tracing::warn!(error = %describe(&err), "Unable to remove message listener");
        }
    }

    fn post(&self, event: &EventEnvelope, target_origin: &str) -> Result<()> {
        let parent = self
            .window
            .parent()
            .map_err(|err| Error::Delivery(describe(&err)))?
            .ok_or_else(|| Error::Delivery("no parent window".to_string()))?;

        // Structured object, not JSON text
        let payload = event
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| Error::Delivery(err.to_string()))?;

        parent
            .post_message(&payload, target_origin)
            .map_err(|err| Error::Delivery(describe(&err)))
    }
}
