// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Typed extraction of capability arguments.
//!
//! Capability requests arrive as a JSON object. Handlers pull each argument
//! through [`CapabilityParams`] with the kind they expect, and a mismatch
//! surfaces as `AccessError::InvalidParameter { name, expected_kind, actual_kind }`
//! instead of an ad hoc check in the handler body.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::AccessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityParams {
    values: Map<String, Value>,
}

impl CapabilityParams {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Accepts an object or `null` (no arguments).
    pub fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(AccessError::InvalidParameter {
                name: "arguments".to_string(),
                expected_kind: ValueKind::Object,
                actual_kind: ValueKind::of(&other),
            }),
        }
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    pub fn required_str(&self, name: &str) -> Result<&str, AccessError> {
        self.optional_str(name)?
            .ok_or_else(|| AccessError::MissingParameter(name.to_string()))
    }

    pub fn optional_str(&self, name: &str) -> Result<Option<&str>, AccessError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(mismatch(name, ValueKind::String, other)),
        }
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, AccessError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(name, ValueKind::Bool, other)),
        }
    }

    pub fn optional_i64(&self, name: &str) -> Result<Option<i64>, AccessError> {
        match self.raw(name) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| mismatch(name, ValueKind::Integer, value)),
        }
    }

    /// A list of strings. Every element must be a string.
    pub fn optional_str_list(&self, name: &str) -> Result<Option<Vec<String>>, AccessError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(mismatch(name, ValueKind::String, other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(mismatch(name, ValueKind::Array, other)),
        }
    }

    /// Any JSON value except `null`.
    pub fn required_value(&self, name: &str) -> Result<&Value, AccessError> {
        self.raw(name)
            .ok_or_else(|| AccessError::MissingParameter(name.to_string()))
    }
}

fn mismatch(name: &str, expected_kind: ValueKind, actual: &Value) -> AccessError {
    AccessError::InvalidParameter {
        name: name.to_string(),
        expected_kind,
        actual_kind: ValueKind::of(actual),
    }
}
