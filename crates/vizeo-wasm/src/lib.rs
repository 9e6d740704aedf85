//! Vizeo WASM - embeddable webview player
//!
//! Browser bindings for `vizeo-core`: the `<video>` element, the parent
//! window message channel and hls.js.
//!
//! ## Usage
//!
//! ```javascript
//! import init, { VizeoPlayer } from '@vizeo/wasm';
//!
//! await init();
//! // Reads ?src=...&autoplay=1&hlsConfig={...} from the frame URL
//! const player = VizeoPlayer.fromLocation('root');
//! ```

use anyhow::{anyhow, Context};
use futures_util::future::LocalBoxFuture;
use std::fmt;
use std::rc::Rc;
use vizeo_core::{
    EngineState, LocalSpawner, MediaElement, MessageChannel, Player, PlayerConfig,
    StreamingBackend,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlVideoElement;

mod channel;
mod hls;
mod logging;
mod media;

pub use channel::WindowChannel;
pub use hls::HlsBackend;
pub use media::DomMedia;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(logging::DEFAULT_FILTER);
    vizeo_core::init();
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    vizeo_core::VERSION.to_string()
}

/// Best-effort text for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn to_js_error(err: impl fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Runs play() promises on the browser microtask queue
struct WasmSpawner;

impl LocalSpawner for WasmSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Player mounted on a `<video>` element
#[wasm_bindgen]
pub struct VizeoPlayer {
    inner: Player,
    video: HtmlVideoElement,
}

#[wasm_bindgen]
impl VizeoPlayer {
    /// Mount on an existing element with a `?src=...` style query string
    #[wasm_bindgen(constructor)]
    pub fn new(video: HtmlVideoElement, query: &str) -> Result<VizeoPlayer, JsValue> {
        let config = PlayerConfig::from_query(query).map_err(to_js_error)?;
        Self::mount(video, config).map_err(|err| to_js_error(format!("{err:#}")))
    }

    /// Create a `<video>` inside `#rootId` and configure it from the frame URL
    #[wasm_bindgen(js_name = fromLocation)]
    pub fn from_location(root_id: &str) -> Result<VizeoPlayer, JsValue> {
        bootstrap(root_id).map_err(|err| to_js_error(format!("{err:#}")))
    }

    /// Replace the source, releasing any streaming session first
    #[wasm_bindgen(js_name = changeSource)]
    pub fn change_source(&mut self, src: &str) -> Result<String, JsValue> {
        self.inner
            .change_source(src)
            .map(|state| state.to_string())
            .map_err(to_js_error)
    }

    /// Stop listening and release the media element
    pub fn unmount(&mut self) {
        self.inner.unmount();
    }

    /// `direct`, `streaming`, `unsupported` or `uninitialized`
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.inner.state().to_string()
    }

    /// Source currently mounted
    #[wasm_bindgen(getter)]
    pub fn src(&self) -> String {
        self.inner.config().src.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.inner.id().to_string()
    }

    /// Origin the parent locked in, `*` until the first command
    #[wasm_bindgen(getter, js_name = trustedOrigin)]
    pub fn trusted_origin(&self) -> String {
        self.inner.trusted_origin().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn video(&self) -> HtmlVideoElement {
        self.video.clone()
    }
}

impl VizeoPlayer {
    fn mount(video: HtmlVideoElement, config: PlayerConfig) -> anyhow::Result<Self> {
        let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;

        let media: Rc<dyn MediaElement> = Rc::new(DomMedia::new(video.clone()));
        let channel: Rc<dyn MessageChannel> = Rc::new(WindowChannel::new(window));
        let backend: Rc<dyn StreamingBackend> = Rc::new(HlsBackend::new(video.clone()));

        let inner = Player::mount(config, media, channel, backend, Rc::new(WasmSpawner))
            .context("mounting player")?;

        if inner.state() == EngineState::Unsupported {
            tracing::warn!(player = %inner.id(), "Source cannot be played in this browser");
        }

        Ok(Self { inner, video })
    }
}

fn bootstrap(root_id: &str) -> anyhow::Result<VizeoPlayer> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window.document().ok_or_else(|| anyhow!("no document"))?;

    let query = window
        .location()
        .search()
        .map_err(|err| anyhow!("reading location.search: {}", describe(&err)))?;
    let config = PlayerConfig::from_query(&query).context("parsing frame query")?;

    let root = document
        .get_element_by_id(root_id)
        .ok_or_else(|| anyhow!("no element with id {root_id:?}"))?;

    let video = document
        .create_element("video")
        .map_err(|err| anyhow!("creating <video>: {}", describe(&err)))?
        .dyn_into::<HtmlVideoElement>()
        .map_err(|_| anyhow!("created element is not a <video>"))?;

    root.append_child(&video)
        .map_err(|err| anyhow!("appending <video>: {}", describe(&err)))?;

    VizeoPlayer::mount(video, config)
}
