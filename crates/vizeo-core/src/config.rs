//! Player configuration
//!
//! The frame is configured entirely through its URL query string. Each value
//! is coerced (`"1"`/`"true"` → true, `"0"`/`"false"` → false, anything else
//! stays text) and, apart from a few reserved keys, applied to the media
//! element as an attribute.

use crate::{controller::PropertyAccess, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

const SOURCE_KEY: &str = "src";
const STREAMING_KEY: &str = "hlsconfig";
const AUTOPLAY_KEY: &str = "autoplay";

/// Attributes that get a value when the query string leaves them unset or falsy
const DEFAULT_ATTRIBUTES: [(&str, &str); 2] =
    [("crossorigin", "anonymous"), ("controlslist", "nodownload")];

/// A coerced query-string value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Text(String),
}

impl AttributeValue {
    /// Coerce a raw parameter value
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "1" | "true" => AttributeValue::Flag(true),
            "0" | "false" => AttributeValue::Flag(false),
            other => AttributeValue::Text(other.to_string()),
        }
    }

    /// JavaScript truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            AttributeValue::Flag(flag) => *flag,
            AttributeValue::Text(text) => !text.is_empty(),
        }
    }
}

/// Options handed verbatim to the streaming engine (hls.js config object)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamingConfig(pub Map<String, Value>);

/// Configuration of a mounted player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Media or manifest URL
    pub src: String,
    /// Streaming engine options
    #[serde(default)]
    pub streaming: StreamingConfig,
    /// Policy for getProperty / setProperty
    #[serde(default)]
    pub property_access: PropertyAccess,
    /// Remaining media attributes, keyed by lowercase DOM name
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl PlayerConfig {
    /// Config with only a source
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            streaming: StreamingConfig::default(),
            property_access: PropertyAccess::default(),
            attributes: BTreeMap::new(),
        }
    }

    /// Build from a URL query string (leading `?` optional).
    ///
    /// The first occurrence of a repeated key wins.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut src: Option<String> = None;
        let mut streaming: Option<StreamingConfig> = None;
        let mut attributes = BTreeMap::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let key = key.to_ascii_lowercase();
            match key.as_str() {
                SOURCE_KEY => {
                    src.get_or_insert_with(|| value.into_owned());
                }
                STREAMING_KEY => {
                    if streaming.is_some() {
                        continue;
                    }
                    match serde_json::from_str::<Map<String, Value>>(&value) {
                        Ok(map) => streaming = Some(StreamingConfig(map)),
                        Err(err) => {
                            let err = Error::InvalidConfig(format!("hlsConfig: {err}"));
                            warn!(code = err.error_code(), error = %err, "Ignoring invalid hlsConfig parameter");
                        }
                    }
                }
                _ => {
                    attributes
                        .entry(key)
                        .or_insert_with(|| AttributeValue::coerce(&value));
                }
            }
        }

        let src = src.filter(|src| !src.is_empty()).ok_or(Error::MissingSource)?;

        Ok(Self {
            src,
            streaming: streaming.unwrap_or_default(),
            property_access: PropertyAccess::default(),
            attributes,
        })
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.attributes
            .insert(AUTOPLAY_KEY.to_string(), AttributeValue::Flag(autoplay));
        self
    }

    pub fn with_streaming_config(mut self, streaming: StreamingConfig) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_property_access(mut self, access: PropertyAccess) -> Self {
        self.property_access = access;
        self
    }

    pub fn with_attribute(mut self, name: &str, value: AttributeValue) -> Self {
        self.attributes.insert(name.to_ascii_lowercase(), value);
        self
    }

    /// Whether playback should start on its own
    pub fn autoplay(&self) -> bool {
        self.attributes
            .get(AUTOPLAY_KEY)
            .is_some_and(AttributeValue::is_truthy)
    }

    /// Attributes to apply on mount, defaults included
    pub fn media_attributes(&self) -> BTreeMap<String, AttributeValue> {
        let mut attributes = self.attributes.clone();
        for (name, default) in DEFAULT_ATTRIBUTES {
            let unset = attributes.get(name).map_or(true, |value| !value.is_truthy());
            if unset {
                attributes.insert(name.to_string(), AttributeValue::Text(default.to_string()));
            }
        }
        attributes
    }
}
