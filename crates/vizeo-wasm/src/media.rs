//! `HtmlVideoElement` as the player's media element

use crate::describe;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use vizeo_core::{
    AttributeValue, CanPlay, Error, ListenerId, MediaElement, MediaEvent, MediaListener,
    RawProperty, Result,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlVideoElement};

type DomListener = Closure<dyn FnMut(Event)>;

/// A `<video>` element plus the closures registered on it
pub struct DomMedia {
    video: HtmlVideoElement,
    listeners: RefCell<HashMap<ListenerId, (MediaEvent, DomListener)>>,
    next_listener: Cell<u64>,
}

impl DomMedia {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self {
            video,
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl MediaElement for DomMedia {
    async fn play(&self) -> Result<()> {
        let promise = self
            .video
            .play()
            .map_err(|err| Error::PlaybackRejected(describe(&err)))?;

        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| Error::PlaybackRejected(describe(&err)))
    }

    fn pause(&self) {
        if let Err(err) = self.video.pause() {
            tracing::warn!(error = %describe(&err), "pause() threw");
        }
    }

    fn is_paused(&self) -> bool {
        self.video.paused()
    }

    fn set_current_time(&self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn is_muted(&self) -> bool {
        self.video.muted()
    }

    fn set_muted(&self, muted: bool) {
        self.video.set_muted(muted);
    }

    fn property(&self, name: &str) -> Option<RawProperty> {
        let value = js_sys::Reflect::get(&self.video, &JsValue::from_str(name)).ok()?;

        if value.is_undefined() {
            None
        } else if let Some(text) = value.as_string() {
            Some(RawProperty::Text(text))
        } else if let Some(number) = value.as_f64() {
            Some(RawProperty::Number(number))
        } else if let Some(flag) = value.as_bool() {
            Some(RawProperty::Bool(flag))
        } else {
            Some(RawProperty::Opaque)
        }
    }

    fn set_property(&self, name: &str, value: &Value) -> Result<()> {
        let write_error = |reason: String| Error::PropertyWrite {
            name: name.to_string(),
            reason,
        };

        let js_value = value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| write_error(err.to_string()))?;

        js_sys::Reflect::set(&self.video, &JsValue::from_str(name), &js_value)
            .map_err(|err| write_error(describe(&err)))?;
        Ok(())
    }

    fn set_attribute(&self, name: &str, value: &AttributeValue) -> Result<()> {
        let result = match value {
            AttributeValue::Flag(true) => self.video.set_attribute(name, ""),
            AttributeValue::Flag(false) => self.video.remove_attribute(name),
            AttributeValue::Text(text) => self.video.set_attribute(name, text),
        };
        result.map_err(|err| Error::PropertyWrite {
            name: name.to_string(),
            reason: describe(&err),
        })
    }

    fn set_src(&self, url: &str) {
        self.video.set_src(url);
    }

    fn remove_src(&self) {
        // removeAttribute("src") cannot fail for a valid name
        let _ = self.video.remove_attribute("src");
    }

    fn set_preload(&self, preload: &str) {
        self.video.set_preload(preload);
    }

    fn load(&self) {
        self.video.load();
    }

    fn can_play_type(&self, mime: &str) -> CanPlay {
        CanPlay::from_dom(&self.video.can_play_type(mime))
    }

    fn add_listener(&self, event: MediaEvent, listener: MediaListener) -> Result<ListenerId> {
        let closure = DomListener::new(move |_: Event| listener(event));

        self.video
            .add_event_listener_with_callback(event.as_str(), closure.as_ref().unchecked_ref())
            .map_err(|err| Error::Listener(describe(&err)))?;

        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, (event, closure));
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        let Some((event, closure)) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };

        if let Err(err) = self
            .video
            .remove_event_listener_with_callback(event.as_str(), closure.as_ref().unchecked_ref())
        {
            tracing::warn!(event = %event, error = %describe(&err), "Unable to remove media listener");
        }
    }
}

impl Drop for DomMedia {
    fn drop(&mut self) {
        let ids: Vec<ListenerId> = self.listeners.borrow().keys().copied().collect();
        for id in ids {
            self.remove_listener(id);
        }
    }
}
