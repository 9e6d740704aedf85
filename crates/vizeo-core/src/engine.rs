//! Streaming Engine - owns the media element's source lifecycle
//!
//! Per source:
//! - plain files, and manifests the element plays natively, are attached
//!   directly with a preview-frame fragment
//! - other manifests go through a streaming session from the backend
//! - without either, the source is reported unsupported and left alone
//!
//! Native media events are forwarded to the event sink while a source is
//! mounted. Teardown is idempotent and always releases the session.

use crate::{
    config::PlayerConfig,
    media::{ListenerId, MediaElement, MediaEvent, MediaListener, HLS_MIME_TYPE},
    protocol::{EventEnvelope, EventSink},
    source::{detect_source_kind, without_fragment, SourceKind},
    streaming::{StreamingBackend, StreamingEvent, StreamingListener, StreamingSession},
    task::LocalSpawner,
    Error, Result,
};
use futures_util::future::FutureExt;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, info, instrument, warn};

/// Appended to direct sources so the element decodes a first frame
/// without starting playback.
pub const PREVIEW_FRAGMENT: &str = "#t=0.001";

/// Where the engine is for the current source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing mounted
    Uninitialized,
    /// The media element plays the URL itself
    DirectPlayback,
    /// A streaming session feeds the media element
    StreamingActive,
    /// No way to play this source here
    Unsupported,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Uninitialized => write!(f, "uninitialized"),
            EngineState::DirectPlayback => write!(f, "direct"),
            EngineState::StreamingActive => write!(f, "streaming"),
            EngineState::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Source selection and media handle lifecycle
pub struct StreamingEngine {
    /// The media element
    media: Rc<dyn MediaElement>,
    /// Streaming session factory
    backend: Rc<dyn StreamingBackend>,
    /// Event loop for autoplay requests
    spawner: Rc<dyn LocalSpawner>,
    /// Destination of forwarded native events
    sink: Rc<dyn EventSink>,
    /// Current state
    state: EngineState,
    /// Live streaming session, if any
    session: Option<Box<dyn StreamingSession>>,
    /// Native event listeners registered on mount
    listeners: Vec<ListenerId>,
}

impl StreamingEngine {
    pub fn new(
        media: Rc<dyn MediaElement>,
        backend: Rc<dyn StreamingBackend>,
        spawner: Rc<dyn LocalSpawner>,
        sink: Rc<dyn EventSink>,
    ) -> Self {
        Self {
            media,
            backend,
            spawner,
            sink,
            state: EngineState::Uninitialized,
            session: None,
            listeners: Vec::new(),
        }
    }

    /// Get current state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Whether a streaming session is alive
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Mount `config.src`, tearing down any previous source first
    #[instrument(skip(self, config), fields(src = %config.src))]
    pub fn mount(&mut self, config: &PlayerConfig) -> EngineState {
        if self.state != EngineState::Uninitialized {
            self.teardown();
        }

        self.subscribe_events();
        self.state = self.attach(config);

        info!(state = %self.state, "Source mounted");
        self.state
    }

    /// Release the current source. Safe to call any number of times.
    #[instrument(skip(self))]
    pub fn teardown(&mut self) {
        for id in self.listeners.drain(..) {
            self.media.remove_listener(id);
        }

        if self.state == EngineState::Uninitialized {
            return;
        }

        self.media.pause();
        self.media.remove_src();
        self.media.load();

        if let Some(mut session) = self.session.take() {
            session.destroy();
            debug!("Streaming session destroyed");
        }

        info!(from = %self.state, "Source torn down");
        self.state = EngineState::Uninitialized;
    }

    fn subscribe_events(&mut self) {
        for event in MediaEvent::ALL {
            let sink = Rc::clone(&self.sink);
            let listener: MediaListener =
                Rc::new(move |event: MediaEvent| sink.emit(EventEnvelope::named(event.as_str())));

            match self.media.add_listener(event, listener) {
                Ok(id) => self.listeners.push(id),
                Err(err) => {
                    warn!(code = err.error_code(), event = %event, error = %err, "Unable to forward media event");
                }
            }
        }
    }

    fn attach(&mut self, config: &PlayerConfig) -> EngineState {
        let src = config.src.as_str();

        let kind = detect_source_kind(src);
        if kind == SourceKind::File || self.media.can_play_type(HLS_MIME_TYPE).is_supported() {
            self.attach_direct(src);
            return EngineState::DirectPlayback;
        }

        if !self.backend.is_supported() {
            let err = Error::UnsupportedEnvironment;
            error!(code = err.error_code(), "HLS is not supported on this browser");
            return EngineState::Unsupported;
        }

        match self.start_session(config) {
            Ok(session) => {
                self.session = Some(session);
                EngineState::StreamingActive
            }
            Err(err) => {
                error!(code = err.error_code(), error = %err, "Unable to start streaming session");
                EngineState::Unsupported
            }
        }
    }

    fn attach_direct(&self, src: &str) {
        self.media
            .set_src(&format!("{}{}", without_fragment(src), PREVIEW_FRAGMENT));
        self.media.set_preload("auto");
    }

    fn start_session(&self, config: &PlayerConfig) -> Result<Box<dyn StreamingSession>> {
        let mut session = self.backend.create(&config.streaming)?;

        let listener = self.streaming_listener(config.autoplay());
        let setup = session
            .subscribe(listener)
            .and_then(|()| session.attach_media())
            .and_then(|()| session.load_source(&config.src));

        match setup {
            Ok(()) => Ok(session),
            Err(err) => {
                session.destroy();
                Err(err)
            }
        }
    }

    fn streaming_listener(&self, autoplay: bool) -> StreamingListener {
        let media = Rc::clone(&self.media);
        let spawner = Rc::clone(&self.spawner);

        Rc::new(move |event: StreamingEvent| match event {
            StreamingEvent::ManifestParsed => {
                debug!(autoplay, "Manifest parsed");
                if autoplay {
                    let media = Rc::clone(&media);
                    spawner.spawn_local(
                        async move {
                            if let Err(err) = media.play().await {
                                warn!(code = err.error_code(), error = %err, "Unable to autoplay prior to user interaction");
                            }
                        }
                        .boxed_local(),
                    );
                }
            }
            StreamingEvent::Error(streaming) => {
                let fatal = streaming.fatal;
                let err = Error::streaming(streaming.kind, streaming.details, fatal);
                if fatal {
                    error!(code = err.error_code(), error = %err, fatal, "Streaming error");
                } else {
                    warn!(code = err.error_code(), error = %err, fatal, "Streaming error");
                }
            }
        })
    }
}

impl Drop for StreamingEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}
