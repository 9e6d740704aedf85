//! Vizeo Core - Remote-controlled webview video player
//!
//! The player runs inside a sandboxed frame. The embedding page drives it
//! over the cross-context message channel and receives playback events back:
//! - JSON command protocol with first-contact origin trust
//! - Command dispatch onto the media element
//! - Native event forwarding
//! - Direct vs. streaming-engine source selection, with teardown
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Vizeo Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   MessageChannel                                                │
//! │         │                                                       │
//! │  ┌──────┴───────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │   Message    │──▶│    Video     │──▶│    Media     │         │
//! │  │    Bridge    │   │  Controller  │   │   Element    │         │
//! │  └──────┬───────┘   └──────────────┘   └──────┬───────┘         │
//! │         ▲                                     │                 │
//! │         │           ┌──────────────┐          │                 │
//! │         └───────────│  Streaming   │◀─────────┘                 │
//! │           events    │    Engine    │──▶ StreamingBackend        │
//! │                     └──────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Platform specifics (DOM, `postMessage`, hls.js) live behind the
//! [`MediaElement`], [`MessageChannel`], [`StreamingBackend`] and
//! [`LocalSpawner`] traits.

pub mod error;
pub mod protocol;
pub mod origin;
pub mod channel;
pub mod media;
pub mod source;
pub mod streaming;
pub mod task;
pub mod config;
pub mod controller;
pub mod engine;
pub mod bridge;
pub mod player;

pub use error::{Error, Result};
pub use protocol::{Command, CommandEnvelope, EventEnvelope, EventSink, PropertyValue};
pub use origin::TrustedOrigin;
pub use channel::{InboundHandler, InboundMessage, MessageChannel, MessageSource, SubscriptionId};
pub use media::{CanPlay, ListenerId, MediaElement, MediaEvent, MediaListener, RawProperty};
pub use source::{detect_source_kind, SourceKind};
pub use streaming::{StreamingBackend, StreamingError, StreamingEvent, StreamingListener, StreamingSession};
pub use task::LocalSpawner;
pub use config::{AttributeValue, PlayerConfig, StreamingConfig};
pub use controller::{PropertyAccess, VideoController};
pub use engine::{EngineState, StreamingEngine};
pub use bridge::{MessageBridge, Outbound};
pub use player::{Player, PlayerId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "Vizeo Core initialized");
}
