//! Unwrapping of the backend's response envelopes.
//!
//! Lists come as `{ "data": { "items": [...], "totalItems": N } }`, older endpoints answer
//! `{ "data": [...] }`. Single records come as `{ "data": record }`, some endpoints nest once more
//! as `{ "data": { "data": record } }`. Every operation of the provider goes through the two
//! types in here, nothing else looks into a response body.

use serde_json::{Map, Value};

/// The payload of a single record response.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordEnvelope {
    /// The record sits directly in `data`.
    Flat(Value),
    /// The record was nested in a second `data` object.
    Nested(Value),
}

impl RecordEnvelope {
    /// Classify a complete response body.
    ///
    /// A body without a `data` key is taken as the payload itself.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(mut map) if map.contains_key("data") => {
                let payload = map.remove("data").unwrap_or(Value::Null);
                Self::from_payload(payload)
            }
            other => {
                if !other.is_null() {
                    log::warn!("record response without 'data' envelope, using body as is");
                }
                Self::from_payload(other)
            }
        }
    }

    /// Classify the content of the outer `data` key.
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
                Self::Nested(map.remove("data").unwrap_or(Value::Null))
            }
            other => Self::Flat(other),
        }
    }

    pub fn unwrap(self) -> Value {
        match self {
            Self::Flat(record) | Self::Nested(record) => record,
        }
    }
}

/// Unwrap a single record payload. Applying this to an already unwrapped record is a no-op.
pub fn unwrap_record(payload: Value) -> Value {
    RecordEnvelope::from_payload(payload).unwrap()
}

/// The payload of a list response.
#[derive(Clone, Debug, PartialEq)]
pub enum ListEnvelope {
    /// `{ "items": [...], "totalItems": N }`
    Paged { items: Vec<Value>, total_items: u64 },
    /// A bare array, the total is unknown.
    Bare(Vec<Value>),
}

impl ListEnvelope {
    /// Classify a complete response body.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(payload) => Self::from_payload(payload),
                None => {
                    log::warn!("list response without 'data' envelope, returning empty list");
                    Self::Bare(Vec::new())
                }
            },
            Value::Array(items) => Self::Bare(items),
            _ => {
                log::warn!("list response is neither object nor array, returning empty list");
                Self::Bare(Vec::new())
            }
        }
    }

    /// Classify the content of the outer `data` key.
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::Object(map) if map.contains_key("items") => Self::from_paged(map),
            Value::Array(items) => Self::Bare(items),
            Value::Null => Self::Bare(Vec::new()),
            other => {
                log::warn!("list payload is not an array, wrapping single value");
                Self::Bare(vec![other])
            }
        }
    }

    fn from_paged(mut map: Map<String, Value>) -> Self {
        let items = match map.remove("items") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other],
        };

        let total_items = match map.get("totalItems") {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };

        Self::Paged { items, total_items }
    }

    /// The items and the total count, which is `0` when the backend did not provide one.
    pub fn unwrap(self) -> (Vec<Value>, u64) {
        match self {
            Self::Paged { items, total_items } => (items, total_items),
            Self::Bare(items) => (items, 0),
        }
    }
}
