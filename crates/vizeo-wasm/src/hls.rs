//! hls.js as the streaming backend
//!
//! Expects the `Hls` class on the global object (hls.js UMD build). When it
//! is missing the backend reports itself unsupported.

use crate::describe;
use serde::Serialize;
use vizeo_core::{
    Error, Result, StreamingBackend, StreamingConfig, StreamingError, StreamingEvent,
    StreamingListener, StreamingSession,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlMediaElement, HtmlVideoElement};

/// `Hls.Events.MANIFEST_PARSED`
const MANIFEST_PARSED: &str = "hlsManifestParsed";
/// `Hls.Events.ERROR`
const ERROR: &str = "hlsError";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = Hls)]
    type Hls;

    #[wasm_bindgen(catch, static_method_of = Hls, js_name = isSupported)]
    fn is_supported() -> std::result::Result<bool, JsValue>;

    #[wasm_bindgen(catch, constructor)]
    fn new(config: &JsValue) -> std::result::Result<Hls, JsValue>;

    #[wasm_bindgen(catch, method, js_name = attachMedia)]
    fn attach_media(this: &Hls, media: &HtmlMediaElement) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch, method, js_name = loadSource)]
    fn load_source(this: &Hls, src: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch, method)]
    fn on(this: &Hls, event: &str, listener: &js_sys::Function) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn destroy(this: &Hls);
}

/// Creates hls.js instances bound to one `<video>`
pub struct HlsBackend {
    video: HtmlVideoElement,
}

impl HlsBackend {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self { video }
    }
}

impl StreamingBackend for HlsBackend {
    fn is_supported(&self) -> bool {
        // Throws when hls.js was not loaded
        Hls::is_supported().unwrap_or(false)
    }

    fn create(&self, config: &StreamingConfig) -> Result<Box<dyn StreamingSession>> {
        let config = config
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| Error::streaming("setup", err.to_string(), true))?;

        let hls = Hls::new(&config).map_err(|err| Error::streaming("setup", describe(&err), true))?;

        Ok(Box::new(HlsSession {
            hls,
            video: self.video.clone(),
            callbacks: Vec::new(),
            destroyed: false,
        }))
    }
}

/// One hls.js instance
struct HlsSession {
    hls: Hls,
    video: HtmlVideoElement,
    /// Kept alive for as long as hls.js may call them
    callbacks: Vec<Closure<dyn FnMut(JsValue, JsValue)>>,
    destroyed: bool,
}

impl HlsSession {
    fn register(&mut self, event: &str, callback: Closure<dyn FnMut(JsValue, JsValue)>) -> Result<()> {
        self.hls
            .on(event, callback.as_ref().unchecked_ref())
            .map_err(|err| Error::Listener(describe(&err)))?;
        self.callbacks.push(callback);
        Ok(())
    }
}

impl StreamingSession for HlsSession {
    fn attach_media(&mut self) -> Result<()> {
        self.hls
            .attach_media(&self.video)
            .map_err(|err| Error::streaming("setup", describe(&err), true))
    }

    fn load_source(&mut self, src: &str) -> Result<()> {
        self.hls
            .load_source(src)
            .map_err(|err| Error::streaming("setup", describe(&err), true))
    }

    fn subscribe(&mut self, listener: StreamingListener) -> Result<()> {
        let on_parsed = listener.clone();
        self.register(
            MANIFEST_PARSED,
            Closure::new(move |_: JsValue, _: JsValue| on_parsed(StreamingEvent::ManifestParsed)),
        )?;

        self.register(
            ERROR,
            Closure::new(move |_: JsValue, data: JsValue| {
                listener(StreamingEvent::Error(streaming_error(&data)))
            }),
        )
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.hls.destroy();
        self.callbacks.clear();
    }
}

impl Drop for HlsSession {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Read `{ type, details, fatal }` off an hls.js error payload
fn streaming_error(data: &JsValue) -> StreamingError {
    let field = |name: &str| js_sys::Reflect::get(data, &JsValue::from_str(name)).ok();

    StreamingError {
        kind: field("type")
            .and_then(|value| value.as_string())
            .unwrap_or_else(|| "unknown".to_string()),
        details: field("details")
            .and_then(|value| value.as_string())
            .unwrap_or_default(),
        fatal: field("fatal")
            .and_then(|value| value.as_bool())
            .unwrap_or(false),
    }
}
