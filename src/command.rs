//! Command payloads, requests, and response envelopes.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CommandError;

/// Response type tag carried by every [`CommandResponse`].
pub const JSON_RESPONSE_TYPE: &str = "json";

/// Opaque bag of named values handed to a worker.
///
/// The registry and dispatchers never inspect the contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandPayload(BTreeMap<String, Value>);

impl CommandPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }
}

impl From<serde_json::Map<String, Value>> for CommandPayload {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for CommandPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Result envelope returned to a caller.
///
/// `data` is absent for legitimate "no content" outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub data: Option<T>,
    pub response_type: String,
}

impl<T> CommandResponse<T> {
    pub fn new(data: Option<T>) -> Self {
        Self {
            data,
            response_type: JSON_RESPONSE_TYPE.to_string(),
        }
    }

    pub fn with_data(data: T) -> Self {
        Self::new(Some(data))
    }

    pub fn empty() -> Self {
        Self::new(None)
    }
}

impl CommandResponse<Value> {
    /// Decode the untyped worker reply into the caller's response type.
    ///
    /// A reply that does not fit `T` is reported as an execution failure of
    /// the command named `name`.
    pub fn decode<T: DeserializeOwned>(self, name: &str) -> Result<CommandResponse<T>, CommandError> {
        let data = self
            .data
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| {
                CommandError::execution(name, format!("Failed to decode response: {e}"))
            })?;
        Ok(CommandResponse {
            data,
            response_type: self.response_type,
        })
    }
}

/// Request to execute one command, as delivered to a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteCommand {
    pub name: String,
    pub payload: Option<CommandPayload>,
}

impl ExecuteCommand {
    pub fn new(name: impl Into<String>, payload: Option<CommandPayload>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}
