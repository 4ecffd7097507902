//! Gateway message format
//!
//! Every frame in either direction is a single JSON object with a string
//! `type` field. Outbound bodies travel under `data`, `payload`, `filters`
//! or `channel` depending on the endpoint; the server is not consistent
//! about which, so all four are supported as-is.

use super::message_types;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outbound request message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Message type (dispatch key on the server)
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl OutboundMessage {
    /// Create a message with only a type
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: None,
            payload: None,
            filters: None,
            channel: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Credential-based authentication request
    #[must_use]
    pub fn authenticate(email: &str, password: &str) -> Self {
        Self::new(message_types::AUTHENTICATE)
            .with_payload(serde_json::json!({ "email": email, "password": password }))
    }

    /// Token-based authentication request
    #[must_use]
    pub fn authenticate_with_token(token: &str) -> Self {
        Self::new(message_types::AUTHENTICATE).with_payload(serde_json::json!({ "token": token }))
    }

    /// Channel subscription request
    #[must_use]
    pub fn subscribe(channel: &str) -> Self {
        Self::new(message_types::SUBSCRIBE).with_channel(channel)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OutboundMessage(type={})", self.kind)
    }
}

/// A serialized outbound frame, ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    kind: String,
    text: String,
}

impl OutboundFrame {
    /// Serialize any message that renders as a JSON object with a string `type`
    pub fn encode<M: Serialize + ?Sized>(message: &M) -> Result<Self, FrameError> {
        let value = serde_json::to_value(message)?;
        let kind = match value.as_object() {
            Some(object) => match object.get("type") {
                Some(Value::String(kind)) => kind.clone(),
                _ => return Err(FrameError::MissingType),
            },
            None => return Err(FrameError::NotAnObject),
        };
        let text = serde_json::to_string(&value)?;

        Ok(Self { kind, text })
    }

    /// Message type of this frame
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Serialized JSON text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// A parsed inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    kind: String,
    payload: Value,
    raw: Value,
}

impl InboundMessage {
    /// Parse an inbound text frame
    ///
    /// The frame must be a JSON object whose `type` field is a string.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let raw: Value = serde_json::from_str(text)?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self, FrameError> {
        let object = raw.as_object().ok_or(FrameError::NotAnObject)?;
        let kind = match object.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            _ => return Err(FrameError::MissingType),
        };

        let payload: Map<String, Value> = object
            .iter()
            .filter(|(key, _)| key.as_str() != "type")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            kind,
            payload: Value::Object(payload),
            raw,
        })
    }

    /// The `type` discriminator
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Everything except `type`
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The full message, including `type`
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Frame encoding/decoding errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame is not a JSON object")]
    NotAnObject,

    #[error("Frame has no string `type` field")]
    MissingType,
}

/// Body of a server-reported `error` frame
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<Value>,
}

impl ServerError {
    /// Parse from an `error` payload; missing fields default to empty
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        Self::deserialize(payload).unwrap_or_default()
    }

    /// The server did not recognise a request type; not actionable for users
    #[must_use]
    pub fn is_unknown_message_type(&self) -> bool {
        self.message.contains("Unknown message type")
    }

    /// The error concerns authentication
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        self.message.to_ascii_lowercase().contains("authentication")
    }
}
