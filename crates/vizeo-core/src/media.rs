//! Media resource abstraction
//!
//! [`MediaElement`] is the surface of an HTML media element that the player
//! needs: playback control, dynamic property access, attributes and native
//! event subscription.

use crate::{config::AttributeValue, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// MIME type of HLS manifests
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// Native media events forwarded to the embedding context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    Resize,
    Seeking,
    Seeked,
    CanPlay,
    LoadedMetadata,
    LoadedData,
    LoadStart,
    Load,
    DurationChange,
    VolumeChange,
    Play,
    Error,
    Pause,
    CanPlayThrough,
    Ended,
    Playing,
    TimeUpdate,
}

impl MediaEvent {
    /// Every forwarded event, in subscription order
    pub const ALL: [MediaEvent; 17] = [
        MediaEvent::Resize,
        MediaEvent::Seeking,
        MediaEvent::Seeked,
        MediaEvent::CanPlay,
        MediaEvent::LoadedMetadata,
        MediaEvent::LoadedData,
        MediaEvent::LoadStart,
        MediaEvent::Load,
        MediaEvent::DurationChange,
        MediaEvent::VolumeChange,
        MediaEvent::Play,
        MediaEvent::Error,
        MediaEvent::Pause,
        MediaEvent::CanPlayThrough,
        MediaEvent::Ended,
        MediaEvent::Playing,
        MediaEvent::TimeUpdate,
    ];

    /// DOM event name
    pub fn as_str(self) -> &'static str {
        match self {
            MediaEvent::Resize => "resize",
            MediaEvent::Seeking => "seeking",
            MediaEvent::Seeked => "seeked",
            MediaEvent::CanPlay => "canplay",
            MediaEvent::LoadedMetadata => "loadedmetadata",
            MediaEvent::LoadedData => "loadeddata",
            MediaEvent::LoadStart => "loadstart",
            MediaEvent::Load => "load",
            MediaEvent::DurationChange => "durationchange",
            MediaEvent::VolumeChange => "volumechange",
            MediaEvent::Play => "play",
            MediaEvent::Error => "error",
            MediaEvent::Pause => "pause",
            MediaEvent::CanPlayThrough => "canplaythrough",
            MediaEvent::Ended => "ended",
            MediaEvent::Playing => "playing",
            MediaEvent::TimeUpdate => "timeupdate",
        }
    }
}

impl fmt::Display for MediaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaEvent {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MediaEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or(())
    }
}

/// Answer of `canPlayType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanPlay {
    No,
    Maybe,
    Probably,
}

impl CanPlay {
    /// Parse the DOM answer (`""`, `"maybe"`, `"probably"`)
    pub fn from_dom(answer: &str) -> Self {
        match answer {
            "probably" => CanPlay::Probably,
            "maybe" => CanPlay::Maybe,
            _ => CanPlay::No,
        }
    }

    pub fn is_supported(self) -> bool {
        self != CanPlay::No
    }
}

/// A property value as read off the media element, before filtering
#[derive(Debug, Clone, PartialEq)]
pub enum RawProperty {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Objects, functions, `null`: anything that is not a primitive
    Opaque,
}

/// Callback for native media events
pub type MediaListener = Rc<dyn Fn(MediaEvent)>;

/// Identifies a registered media listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The live media resource
#[async_trait(?Send)]
pub trait MediaElement {
    /// Request playback. Fails when the platform blocks it.
    async fn play(&self) -> Result<()>;

    fn pause(&self);

    fn is_paused(&self) -> bool;

    /// Seek, in seconds
    fn set_current_time(&self, seconds: f64);

    fn is_muted(&self) -> bool;

    fn set_muted(&self, muted: bool);

    /// Read an arbitrary property. `None` when it is undefined.
    fn property(&self, name: &str) -> Option<RawProperty>;

    /// Write an arbitrary property
    fn set_property(&self, name: &str, value: &Value) -> Result<()>;

    /// Set or clear an HTML attribute
    fn set_attribute(&self, name: &str, value: &AttributeValue) -> Result<()>;

    fn set_src(&self, url: &str);

    /// Remove the `src` attribute entirely
    fn remove_src(&self);

    fn set_preload(&self, preload: &str);

    /// Reset the element and reselect its source
    fn load(&self);

    fn can_play_type(&self, mime: &str) -> CanPlay;

    fn add_listener(&self, event: MediaEvent, listener: MediaListener) -> Result<ListenerId>;

    fn remove_listener(&self, id: ListenerId);
}
