//! Wire protocol between the embedding page and the player.
//!
//! Commands arrive as JSON text; events leave as structured objects.

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound instruction from the embedding context.
///
/// Fields are read loosely: a `type` or `name` that is not a string is
/// treated as absent rather than rejecting the whole message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Command name (field name is `type` in JSON)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    /// Operation-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Property name for `setProperty`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
}

impl CommandEnvelope {
    /// Parse a text-encoded envelope
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Map the envelope onto the dispatch table.
    ///
    /// Returns `None` for unrecognized types and for `setProperty` without a
    /// non-empty `name` and a truthy `value`.
    pub fn into_command(self) -> Option<Command> {
        let kind = self.kind.as_ref().and_then(Value::as_str).unwrap_or_default();
        match kind {
            "play" => Some(Command::Play),
            "pause" => Some(Command::Pause),
            "stop" => Some(Command::Stop),
            "mute" => Some(Command::Mute),
            "unMute" => Some(Command::UnMute),
            "getProperty" => {
                let name = match &self.value {
                    Some(Value::String(name)) => name.clone(),
                    _ => String::new(),
                };
                Some(Command::GetProperty {
                    name,
                    reply_type: self.value.unwrap_or(Value::Null),
                })
            }
            "setProperty" => match (self.name, self.value) {
                (Some(Value::String(name)), Some(value)) if !name.is_empty() && is_truthy(&value) => {
                    Some(Command::SetProperty { name, value })
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// A validated command from the dispatch table
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    Mute,
    UnMute,
    /// Read `name`; the reply's `type` carries `reply_type` (the raw request value).
    GetProperty { name: String, reply_type: Value },
    SetProperty { name: String, value: Value },
}

/// Outbound notification to the embedding context.
///
/// `value` stays a [`PropertyValue`] until the channel serializes it, so
/// non-finite numbers such as a live stream's `duration` reach the page as
/// `Infinity` through a structured-clone channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event name, or the echoed request value for property replies.
    #[serde(rename = "type", default, skip_serializing_if = "Value::is_null")]
    pub kind: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyValue>,
}

impl EventEnvelope {
    /// Event carrying only a name
    pub fn named(kind: impl Into<String>) -> Self {
        Self {
            kind: Value::String(kind.into()),
            value: None,
        }
    }

    /// Reply to `getProperty`.
    ///
    /// `type` echoes whatever the request sent as `value`, not a fixed tag.
    /// Embedding pages match replies on it. A `NaN` reading is sent without
    /// a value.
    pub fn property_reply(reply_type: Value, value: Option<PropertyValue>) -> Self {
        Self {
            kind: reply_type,
            value: value.filter(|value| !value.is_nan()),
        }
    }

    /// Event name as text, if it is one
    pub fn kind_str(&self) -> Option<&str> {
        self.kind.as_str()
    }
}

/// Serializable result of a property read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn is_nan(&self) -> bool {
        matches!(self, PropertyValue::Number(n) if n.is_nan())
    }
}

/// Receiver of outbound events
pub trait EventSink {
    fn emit(&self, event: EventEnvelope);
}

/// JavaScript truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command(raw: &str) -> Option<Command> {
        CommandEnvelope::parse(raw).unwrap().into_command()
    }

    #[test]
    fn test_dispatch_table() {
        assert_eq!(command(r#"{"type":"play"}"#), Some(Command::Play));
        assert_eq!(command(r#"{"type":"pause"}"#), Some(Command::Pause));
        assert_eq!(command(r#"{"type":"stop"}"#), Some(Command::Stop));
        assert_eq!(command(r#"{"type":"mute"}"#), Some(Command::Mute));
        assert_eq!(command(r#"{"type":"unMute"}"#), Some(Command::UnMute));
    }

    #[test]
    fn test_unknown_and_missing_type() {
        assert_eq!(command(r#"{"type":"seek","value":10}"#), None);
        assert_eq!(command(r#"{"type":"unmute"}"#), None);
        assert_eq!(command(r#"{"value":"paused"}"#), None);
    }

    #[test]
    fn test_non_string_type_is_unknown() {
        assert_eq!(command(r#"{"type":null}"#), None);
        assert_eq!(command(r#"{"type":5}"#), None);
        assert_eq!(command(r#"{"type":["play"]}"#), None);
    }

    #[test]
    fn test_non_string_name_is_ignored() {
        assert_eq!(command(r#"{"type":"play","name":1}"#), Some(Command::Play));
        assert_eq!(command(r#"{"type":"setProperty","name":7,"value":1}"#), None);
        assert_eq!(command(r#"{"type":"setProperty","name":null,"value":1}"#), None);
    }

    #[test]
    fn test_malformed_payload() {
        assert!(CommandEnvelope::parse("play").is_err());
        assert!(CommandEnvelope::parse(r#"{"type":"play""#).is_err());
    }

    #[test]
    fn test_get_property_name_coercion() {
        assert_eq!(
            command(r#"{"type":"getProperty","value":"currentTime"}"#),
            Some(Command::GetProperty {
                name: "currentTime".into(),
                reply_type: json!("currentTime"),
            })
        );
        assert_eq!(
            command(r#"{"type":"getProperty","value":42}"#),
            Some(Command::GetProperty {
                name: String::new(),
                reply_type: json!(42),
            })
        );
    }

    #[test]
    fn test_set_property_requires_name_and_truthy_value() {
        assert_eq!(
            command(r#"{"type":"setProperty","name":"volume","value":0.5}"#),
            Some(Command::SetProperty {
                name: "volume".into(),
                value: json!(0.5),
            })
        );
        assert_eq!(command(r#"{"type":"setProperty","value":0.5}"#), None);
        assert_eq!(command(r#"{"type":"setProperty","name":"","value":1}"#), None);
        assert_eq!(command(r#"{"type":"setProperty","name":"muted","value":false}"#), None);
        assert_eq!(command(r#"{"type":"setProperty","name":"volume","value":0}"#), None);
        assert_eq!(command(r#"{"type":"setProperty","name":"poster","value":""}"#), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_event_serialization() {
        let event = EventEnvelope::named("timeupdate");
        assert_eq!(serde_json::to_value(&event).unwrap(), json!({ "type": "timeupdate" }));

        let reply = EventEnvelope::property_reply(json!("paused"), Some(PropertyValue::Bool(true)));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({ "type": "paused", "value": true })
        );

        let empty = EventEnvelope::property_reply(Value::Null, None);
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));
    }

    #[test]
    fn test_non_finite_property_values() {
        let live = EventEnvelope::property_reply(
            json!("duration"),
            Some(PropertyValue::Number(f64::INFINITY)),
        );
        assert_eq!(live.value, Some(PropertyValue::Number(f64::INFINITY)));

        let unknown = EventEnvelope::property_reply(json!("duration"), Some(PropertyValue::Number(f64::NAN)));
        assert_eq!(unknown.value, None);
        assert_eq!(serde_json::to_value(&unknown).unwrap(), json!({ "type": "duration" }));
    }
}
