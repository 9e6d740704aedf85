//! Video Controller - the capability surface driven by the message bridge
//!
//! Operates on a media element it never creates or destroys; the
//! [`StreamingEngine`](crate::engine::StreamingEngine) owns that lifecycle.

use crate::{
    media::{MediaElement, RawProperty},
    protocol::PropertyValue,
    Error,
};
use futures_util::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, warn};

/// Position `stop` rewinds to.
///
/// Not zero: some players skip the redraw when seeking to exactly 0.
pub const STOP_POSITION: f64 = 0.001;

/// Media properties that can be read under [`PropertyAccess::Restricted`]
const READABLE_PROPERTIES: &[&str] = &[
    "autoplay",
    "controls",
    "crossOrigin",
    "currentSrc",
    "currentTime",
    "defaultMuted",
    "defaultPlaybackRate",
    "duration",
    "ended",
    "height",
    "loop",
    "muted",
    "networkState",
    "paused",
    "playbackRate",
    "playsInline",
    "poster",
    "preload",
    "readyState",
    "seeking",
    "src",
    "videoHeight",
    "videoWidth",
    "volume",
    "width",
];

/// Media properties that can be written under [`PropertyAccess::Restricted`]
const WRITABLE_PROPERTIES: &[&str] = &[
    "autoplay",
    "controls",
    "currentTime",
    "defaultMuted",
    "defaultPlaybackRate",
    "height",
    "loop",
    "muted",
    "playbackRate",
    "playsInline",
    "poster",
    "preload",
    "volume",
    "width",
];

/// Which property names get/set may address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyAccess {
    /// Any name is passed through to the media element
    #[default]
    Permissive,
    /// Only well-known media attributes
    Restricted,
}

impl PropertyAccess {
    pub fn can_read(self, name: &str) -> bool {
        match self {
            PropertyAccess::Permissive => true,
            PropertyAccess::Restricted => READABLE_PROPERTIES.contains(&name),
        }
    }

    pub fn can_write(self, name: &str) -> bool {
        match self {
            PropertyAccess::Permissive => true,
            PropertyAccess::Restricted => WRITABLE_PROPERTIES.contains(&name),
        }
    }
}

/// Remote-control handle over the live media element
#[derive(Clone)]
pub struct VideoController {
    media: Rc<dyn MediaElement>,
    access: PropertyAccess,
}

impl VideoController {
    pub fn new(media: Rc<dyn MediaElement>, access: PropertyAccess) -> Self {
        Self { media, access }
    }

    /// Request playback.
    ///
    /// The returned future never fails: a rejected request (e.g. autoplay
    /// blocked before user interaction) is logged.
    pub fn play(&self) -> LocalBoxFuture<'static, ()> {
        let media = Rc::clone(&self.media);
        async move {
            if let Err(err) = media.play().await {
                warn!(code = err.error_code(), error = %err, "Unable to play prior to user interaction");
            }
        }
        .boxed_local()
    }

    pub fn pause(&self) {
        if !self.media.is_paused() {
            self.media.pause();
        }
    }

    /// Pause and rewind to [`STOP_POSITION`]
    pub fn stop(&self) {
        self.media.pause();
        self.media.set_current_time(STOP_POSITION);
    }

    pub fn mute(&self) {
        if !self.media.is_muted() {
            self.media.set_muted(true);
        }
    }

    pub fn unmute(&self) {
        if self.media.is_muted() {
            self.media.set_muted(false);
        }
    }

    /// Read a property. Only primitive values are returned.
    ///
    /// Falsy readings (`false`, `0`, `""`) are returned as well. Earlier
    /// player builds sent no value for them, so a page that treated a
    /// missing value as `false` now sees e.g. `muted: false` or
    /// `currentTime: 0` explicitly.
    pub fn get_property(&self, name: &str) -> Option<PropertyValue> {
        if !self.access.can_read(name) {
            let err = Error::PropertyNotAllowed(name.to_string());
            debug!(code = err.error_code(), property = name, "Property read denied");
            return None;
        }

        match self.media.property(name)? {
            RawProperty::Text(text) => Some(PropertyValue::Text(text)),
            RawProperty::Number(number) => Some(PropertyValue::Number(number)),
            RawProperty::Bool(flag) => Some(PropertyValue::Bool(flag)),
            RawProperty::Opaque => None,
        }
    }

    /// Write a property. No check of type or existence beyond the access policy.
    pub fn set_property(&self, name: &str, value: &Value) {
        if !self.access.can_write(name) {
            let err = Error::PropertyNotAllowed(name.to_string());
            warn!(code = err.error_code(), property = name, "Property write denied");
            return;
        }

        if let Err(err) = self.media.set_property(name, value) {
            warn!(code = err.error_code(), error = %err, property = name, "Unable to set property");
        }
    }
}
