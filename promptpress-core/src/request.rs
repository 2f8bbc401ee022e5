//! Prompt request construction
//!
//! A [`PromptRequest`] carries the fields that drive a templated generation.
//! Its wire projection is pure and total: the payload is a flat JSON object,
//! extras are kept in a `BTreeMap` so serialization order is deterministic,
//! and a missing required field is a construction-time error, never a
//! request-time one.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while building a prompt request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A required field was never supplied
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

/// A templated generation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptRequest {
    text: String,
    format: String,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl PromptRequest {
    /// Create a request from its required fields
    pub fn new(text: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: format.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Start building a request with optional extra parameters
    pub fn builder() -> PromptRequestBuilder {
        PromptRequestBuilder::default()
    }

    /// Source text the template runs over
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Destination format hint
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Flat JSON projection sent on the wire
    ///
    /// Required fields always win over a same-named extra parameter.
    pub fn to_payload(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.extra {
            map.insert(name.clone(), value.clone());
        }
        map.insert("text".to_string(), Value::String(self.text.clone()));
        map.insert("format".to_string(), Value::String(self.format.clone()));
        Value::Object(map)
    }
}

/// Builder for [`PromptRequest`]
#[derive(Debug, Clone, Default)]
pub struct PromptRequestBuilder {
    text: Option<String>,
    format: Option<String>,
    extra: BTreeMap<String, Value>,
}

impl PromptRequestBuilder {
    /// Set the source text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the destination format hint
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Attach an extra flat parameter
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Finish the request, failing if a required field is absent
    pub fn build(self) -> Result<PromptRequest, BuildError> {
        let text = self.text.ok_or(BuildError::MissingField("text"))?;
        let format = self.format.ok_or(BuildError::MissingField("format"))?;
        Ok(PromptRequest {
            text,
            format,
            extra: self.extra,
        })
    }
}
