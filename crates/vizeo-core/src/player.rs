//! Player - a mounted webview player
//!
//! Wires the three components together for one media element:
//!
//! ```text
//!  channel ──▶ MessageBridge ──▶ VideoController ──▶ media element
//!     ▲              │                                   │ native events
//!     └── Outbound ◀─┴────────── StreamingEngine ◀───────┘
//! ```

use crate::{
    bridge::{MessageBridge, Outbound},
    channel::{InboundHandler, InboundMessage, MessageChannel, SubscriptionId},
    config::PlayerConfig,
    controller::VideoController,
    engine::{EngineState, StreamingEngine},
    media::MediaElement,
    origin::TrustedOrigin,
    streaming::StreamingBackend,
    task::LocalSpawner,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Unique player instance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player mounted on one media element
pub struct Player {
    /// Instance ID, attached to log lines
    id: PlayerId,
    /// Active configuration
    config: PlayerConfig,
    /// Source lifecycle
    engine: StreamingEngine,
    /// Command endpoint
    bridge: Rc<MessageBridge>,
    /// Channel the bridge listens on
    channel: Rc<dyn MessageChannel>,
    /// Bridge subscription, `None` once unmounted
    subscription: Option<SubscriptionId>,
}

impl Player {
    /// Mount a player: apply attributes, attach the source and start
    /// listening for commands.
    #[instrument(skip_all, fields(src = %config.src))]
    pub fn mount(
        config: PlayerConfig,
        media: Rc<dyn MediaElement>,
        channel: Rc<dyn MessageChannel>,
        backend: Rc<dyn StreamingBackend>,
        spawner: Rc<dyn LocalSpawner>,
    ) -> Result<Self> {
        let id = PlayerId::new();

        for (name, value) in config.media_attributes() {
            if let Err(err) = media.set_attribute(&name, &value) {
                warn!(player = %id, code = err.error_code(), attribute = %name, error = %err, "Unable to apply attribute");
            }
        }

        let outbound = Outbound::new(Rc::clone(&channel));
        let mut engine = StreamingEngine::new(
            Rc::clone(&media),
            backend,
            Rc::clone(&spawner),
            Rc::new(outbound.clone()),
        );
        engine.mount(&config);

        let controller = VideoController::new(media, config.property_access);
        let bridge = Rc::new(MessageBridge::new(controller, outbound, spawner));

        let subscription = channel.subscribe(Self::inbound_handler(&bridge))?;

        info!(player = %id, state = %engine.state(), "Player mounted");

        Ok(Self {
            id,
            config,
            engine,
            bridge,
            channel,
            subscription: Some(subscription),
        })
    }

    /// Get player ID
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Current source state
    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    /// The capability object driven by inbound commands
    pub fn controller(&self) -> &VideoController {
        self.bridge.controller()
    }

    pub fn trusted_origin(&self) -> TrustedOrigin {
        self.bridge.trusted_origin()
    }

    pub fn has_streaming_session(&self) -> bool {
        self.engine.has_session()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Replace the source: the current one is torn down first
    #[instrument(skip(self, src), fields(player = %self.id))]
    pub fn change_source(&mut self, src: impl Into<String>) -> Result<EngineState> {
        if !self.is_mounted() {
            return Err(Error::Internal("player is unmounted".to_string()));
        }

        let src = src.into();
        if src.is_empty() {
            return Err(Error::MissingSource);
        }

        info!(from = %self.config.src, to = %src, "Changing source");
        self.config.src = src;
        Ok(self.engine.mount(&self.config))
    }

    /// Stop listening and release the source. Idempotent.
    #[instrument(skip(self), fields(player = %self.id))]
    pub fn unmount(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };

        self.channel.unsubscribe(subscription);
        self.engine.teardown();

        info!("Player unmounted");
    }

    fn inbound_handler(bridge: &Rc<MessageBridge>) -> InboundHandler {
        let bridge: Weak<MessageBridge> = Rc::downgrade(bridge);
        Rc::new(move |message: InboundMessage| {
            if let Some(bridge) = bridge.upgrade() {
                bridge.on_inbound_message(message);
            }
        })
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.unmount();
    }
}
