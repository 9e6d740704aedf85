//! Streaming-buffer engine seam (hls.js in the browser)
//!
//! The engine's segment fetching and buffering are a black box; the player
//! only drives its public control surface and listens to two events.

use crate::{config::StreamingConfig, Result};
use std::rc::Rc;

/// Error reported by the streaming engine
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingError {
    /// Error category, e.g. `networkError`
    pub kind: String,
    /// Specific error, e.g. `manifestLoadError`
    pub details: String,
    /// The engine considers the stream unrecoverable
    pub fatal: bool,
}

/// Events the player reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum StreamingEvent {
    ManifestParsed,
    Error(StreamingError),
}

/// Callback for streaming events
pub type StreamingListener = Rc<dyn Fn(StreamingEvent)>;

/// Factory for streaming sessions, bound to one media element
pub trait StreamingBackend {
    /// Whether the environment can run the engine at all
    fn is_supported(&self) -> bool;

    /// Construct a new engine instance
    fn create(&self, config: &StreamingConfig) -> Result<Box<dyn StreamingSession>>;
}

/// One live engine instance
pub trait StreamingSession {
    /// Attach to the media element the backend was created for
    fn attach_media(&mut self) -> Result<()>;

    /// Start loading a manifest
    fn load_source(&mut self, src: &str) -> Result<()>;

    /// Register the listener for manifest-parsed and error events
    fn subscribe(&mut self, listener: StreamingListener) -> Result<()>;

    /// Release every resource held by the engine. Called exactly once.
    fn destroy(&mut self);
}
