//! In-memory fakes for the platform seams

#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use vizeo_core::{
    AttributeValue, CanPlay, Error, EventEnvelope, InboundHandler, InboundMessage, ListenerId,
    LocalSpawner, MediaElement, MediaEvent, MediaListener, MessageChannel, Player, PlayerConfig,
    RawProperty, Result, StreamingBackend, StreamingConfig, StreamingEvent, StreamingListener,
    StreamingSession, SubscriptionId,
};

// =============================================================================
// Media
// =============================================================================

pub struct FakeMedia {
    paused: Cell<bool>,
    muted: Cell<bool>,
    current_time: Cell<f64>,
    /// NaN until metadata loads, Infinity for live streams
    pub duration: Cell<f64>,
    /// Reject play requests, like an autoplay policy would
    pub block_play: Cell<bool>,
    /// Answer `canPlayType(hls)` with "maybe"
    pub native_hls: Cell<bool>,
    properties: RefCell<HashMap<String, Value>>,
    attributes: RefCell<BTreeMap<String, AttributeValue>>,
    src: RefCell<Option<String>>,
    preload: RefCell<String>,
    calls: RefCell<Vec<String>>,
    listeners: RefCell<Vec<(ListenerId, MediaEvent, MediaListener)>>,
    next_listener: Cell<u64>,
}

impl FakeMedia {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert("volume".to_string(), Value::from(1.0));
        properties.insert("textTracks".to_string(), serde_json::json!({ "length": 0 }));

        Self {
            paused: Cell::new(true),
            muted: Cell::new(false),
            current_time: Cell::new(0.0),
            duration: Cell::new(f64::NAN),
            block_play: Cell::new(false),
            native_hls: Cell::new(false),
            properties: RefCell::new(properties),
            attributes: RefCell::new(BTreeMap::new()),
            src: RefCell::new(None),
            preload: RefCell::new(String::new()),
            calls: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        }
    }

    pub fn is_paused_now(&self) -> bool {
        self.paused.get()
    }

    pub fn position(&self) -> f64 {
        self.current_time.get()
    }

    pub fn src(&self) -> Option<String> {
        self.src.borrow().clone()
    }

    pub fn preload(&self) -> String {
        self.preload.borrow().clone()
    }

    pub fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.borrow().get(name).cloned()
    }

    pub fn raw_property(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(name).cloned()
    }

    /// Every recorded call, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Dispatch a native event to the registered listeners
    pub fn fire(&self, event: MediaEvent) {
        let listeners: Vec<MediaListener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, registered, _)| *registered == event)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

#[async_trait(?Send)]
impl MediaElement for FakeMedia {
    async fn play(&self) -> Result<()> {
        self.record("play");
        if self.block_play.get() {
            return Err(Error::PlaybackRejected("NotAllowedError".to_string()));
        }
        self.paused.set(false);
        Ok(())
    }

    fn pause(&self) {
        self.record("pause");
        self.paused.set(true);
    }

    fn is_paused(&self) -> bool {
        self.paused.get()
    }

    fn set_current_time(&self, seconds: f64) {
        self.record(format!("seek:{seconds}"));
        self.current_time.set(seconds);
    }

    fn is_muted(&self) -> bool {
        self.muted.get()
    }

    fn set_muted(&self, muted: bool) {
        self.record(format!("muted:{muted}"));
        self.muted.set(muted);
    }

    fn property(&self, name: &str) -> Option<RawProperty> {
        match name {
            "paused" => return Some(RawProperty::Bool(self.paused.get())),
            "muted" => return Some(RawProperty::Bool(self.muted.get())),
            "currentTime" => return Some(RawProperty::Number(self.current_time.get())),
            "duration" => return Some(RawProperty::Number(self.duration.get())),
            _ => {}
        }

        let properties = self.properties.borrow();
        Some(match properties.get(name)? {
            Value::String(text) => RawProperty::Text(text.clone()),
            Value::Bool(flag) => RawProperty::Bool(*flag),
            Value::Number(number) => RawProperty::Number(number.as_f64().unwrap_or(f64::NAN)),
            _ => RawProperty::Opaque,
        })
    }

    fn set_property(&self, name: &str, value: &Value) -> Result<()> {
        self.record(format!("set:{name}"));
        match (name, value) {
            ("muted", Value::Bool(flag)) => self.muted.set(*flag),
            ("currentTime", Value::Number(n)) => self.current_time.set(n.as_f64().unwrap_or(0.0)),
            ("paused", _) => {
                return Err(Error::PropertyWrite {
                    name: name.to_string(),
                    reason: "read-only".to_string(),
                })
            }
            _ => {
                self.properties
                    .borrow_mut()
                    .insert(name.to_string(), value.clone());
            }
        }
        Ok(())
    }

    fn set_attribute(&self, name: &str, value: &AttributeValue) -> Result<()> {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        Ok(())
    }

    fn set_src(&self, url: &str) {
        self.record(format!("src:{url}"));
        *self.src.borrow_mut() = Some(url.to_string());
    }

    fn remove_src(&self) {
        self.record("remove_src");
        *self.src.borrow_mut() = None;
    }

    fn set_preload(&self, preload: &str) {
        *self.preload.borrow_mut() = preload.to_string();
    }

    fn load(&self) {
        self.record("load");
    }

    fn can_play_type(&self, mime: &str) -> CanPlay {
        if self.native_hls.get() && mime == "application/vnd.apple.mpegurl" {
            CanPlay::Maybe
        } else {
            CanPlay::No
        }
    }

    fn add_listener(&self, event: MediaEvent, listener: MediaListener) -> Result<ListenerId> {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, event, listener));
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(registered, _, _)| *registered != id);
    }
}

// =============================================================================
// Channel
// =============================================================================

pub struct FakeChannel {
    handlers: RefCell<Vec<(SubscriptionId, InboundHandler)>>,
    next_id: Cell<u64>,
    posted: RefCell<Vec<(EventEnvelope, String)>>,
    /// Make every post fail, like a closed parent window
    pub fail_post: Cell<bool>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            posted: RefCell::new(Vec::new()),
            fail_post: Cell::new(false),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Deliver a message to every subscriber
    pub fn deliver(&self, message: InboundMessage) {
        let handlers: Vec<InboundHandler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in handlers {
            handler(message.clone());
        }
    }

    /// Deliver an external text message
    pub fn send(&self, origin: &str, data: &str) {
        self.deliver(InboundMessage::external(origin, data));
    }

    /// Drain posted events with their target origin
    pub fn take_posted(&self) -> Vec<(EventEnvelope, String)> {
        self.posted.borrow_mut().drain(..).collect()
    }
}

impl MessageChannel for FakeChannel {
    fn subscribe(&self, handler: InboundHandler) -> Result<SubscriptionId> {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, handler));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.borrow_mut().retain(|(registered, _)| *registered != id);
    }

    fn post(&self, event: &EventEnvelope, target_origin: &str) -> Result<()> {
        if self.fail_post.get() {
            return Err(Error::Delivery("target window is closed".to_string()));
        }
        self.posted
            .borrow_mut()
            .push((event.clone(), target_origin.to_string()));
        Ok(())
    }
}

// =============================================================================
// Streaming backend
// =============================================================================

#[derive(Default)]
pub struct BackendStats {
    pub created: Cell<usize>,
    pub destroyed: Cell<usize>,
    pub attached: Cell<usize>,
    pub loaded: RefCell<Vec<String>>,
    pub configs: RefCell<Vec<StreamingConfig>>,
    pub listener: RefCell<Option<StreamingListener>>,
    /// Lifecycle log: "create", "destroy"
    pub lifecycle: RefCell<Vec<&'static str>>,
}

pub struct FakeBackend {
    pub supported: Cell<bool>,
    pub fail_attach: Cell<bool>,
    pub stats: Rc<BackendStats>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            supported: Cell::new(true),
            fail_attach: Cell::new(false),
            stats: Rc::new(BackendStats::default()),
        }
    }

    /// Emit an event from the live session
    pub fn emit(&self, event: StreamingEvent) {
        let listener = self.stats.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }

    pub fn alive(&self) -> usize {
        self.stats.created.get() - self.stats.destroyed.get()
    }
}

impl StreamingBackend for FakeBackend {
    fn is_supported(&self) -> bool {
        self.supported.get()
    }

    fn create(&self, config: &StreamingConfig) -> Result<Box<dyn StreamingSession>> {
        self.stats.created.set(self.stats.created.get() + 1);
        self.stats.configs.borrow_mut().push(config.clone());
        self.stats.lifecycle.borrow_mut().push("create");
        Ok(Box::new(FakeSession {
            stats: Rc::clone(&self.stats),
            fail_attach: self.fail_attach.get(),
        }))
    }
}

pub struct FakeSession {
    stats: Rc<BackendStats>,
    fail_attach: bool,
}

impl StreamingSession for FakeSession {
    fn attach_media(&mut self) -> Result<()> {
        if self.fail_attach {
            return Err(Error::Internal("attachMedia threw".to_string()));
        }
        self.stats.attached.set(self.stats.attached.get() + 1);
        Ok(())
    }

    fn load_source(&mut self, src: &str) -> Result<()> {
        self.stats.loaded.borrow_mut().push(src.to_string());
        Ok(())
    }

    fn subscribe(&mut self, listener: StreamingListener) -> Result<()> {
        *self.stats.listener.borrow_mut() = Some(listener);
        Ok(())
    }

    fn destroy(&mut self) {
        self.stats.destroyed.set(self.stats.destroyed.get() + 1);
        self.stats.lifecycle.borrow_mut().push("destroy");
        self.stats.listener.borrow_mut().take();
    }
}

// =============================================================================
// Spawner
// =============================================================================

#[derive(Default)]
pub struct QueueSpawner {
    tasks: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

impl QueueSpawner {
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run queued tasks until none are left
    pub async fn run_pending(&self) {
        loop {
            let tasks: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                task.await;
            }
        }
    }
}

impl LocalSpawner for QueueSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        self.tasks.borrow_mut().push(task);
    }
}

// =============================================================================
// Harness
// =============================================================================

pub const HOST: &str = "https://host.example";

pub struct Harness {
    pub media: Rc<FakeMedia>,
    pub channel: Rc<FakeChannel>,
    pub backend: Rc<FakeBackend>,
    pub spawner: Rc<QueueSpawner>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            media: Rc::new(FakeMedia::new()),
            channel: Rc::new(FakeChannel::new()),
            backend: Rc::new(FakeBackend::new()),
            spawner: Rc::new(QueueSpawner::default()),
        }
    }

    pub fn mount(&self, config: PlayerConfig) -> Player {
        Player::mount(
            config,
            self.media.clone(),
            self.channel.clone(),
            self.backend.clone(),
            self.spawner.clone(),
        )
        .expect("mount")
    }

    /// Posted events, excluding forwarded native media events
    pub fn replies(&self) -> Vec<(EventEnvelope, String)> {
        self.channel
            .take_posted()
            .into_iter()
            .filter(|(event, _)| {
                event
                    .kind_str()
                    .map_or(true, |kind| kind.parse::<MediaEvent>().is_err())
            })
            .collect()
    }
}
