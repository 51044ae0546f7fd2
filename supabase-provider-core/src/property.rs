//! Property bag - the dynamic, engine-facing representation of resource
//! inputs and outputs
//!
//! The engine exchanges resources as self-describing bags of values. Plain
//! values (null/bool/number/string/list/object) travel as-is; the four
//! wrapper kinds (secret, computed, output, resource reference) must be
//! resolved with [`PropertyValue::unwrap`] before a handler may use them.

use std::collections::BTreeMap;

use crate::error::{ProviderError, ProviderResult};

/// Mapping from property key to value. Keys are unique, order irrelevant;
/// a BTreeMap keeps iteration deterministic for diffing.
pub type PropertyBag = BTreeMap<String, PropertyValue>;

/// A single dynamically typed property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    /// 64-bit integer or float; no coercion across bool/string/number
    Number(serde_json::Number),
    String(String),
    List(Vec<PropertyValue>),
    Object(PropertyBag),
    /// Marks the wrapped value as sensitive; unwraps to the inner value
    Secret(Box<PropertyValue>),
    /// Value not yet known; occurs only during preview
    Computed,
    /// A resolved async result; unwraps to the inner value
    Output(Box<PropertyValue>),
    /// Reference to another resource; unwraps to the referenced id
    ResourceReference { id: Box<PropertyValue> },
}

/// Context for resolving wrapper values
#[derive(Debug, Clone, Copy, Default)]
pub struct UnwrapContext {
    /// During preview a computed value resolves to null; outside preview
    /// encountering one is a caller bug and fails the call.
    pub preview: bool,
}

impl UnwrapContext {
    pub fn preview(preview: bool) -> Self {
        Self { preview }
    }
}

impl PropertyValue {
    /// Resolve all wrapper kinds to the underlying plain value.
    ///
    /// Deterministic: the same value and context always resolve identically.
    pub fn unwrap(&self, ctx: UnwrapContext) -> ProviderResult<PropertyValue> {
        match self {
            PropertyValue::Secret(inner) => inner.unwrap(ctx),
            PropertyValue::Output(inner) => inner.unwrap(ctx),
            PropertyValue::ResourceReference { id } => id.unwrap(ctx),
            PropertyValue::Computed => {
                if ctx.preview {
                    Ok(PropertyValue::Null)
                } else {
                    Err(ProviderError::Unwrap(
                        "computed value encountered outside preview".to_string(),
                    ))
                }
            }
            PropertyValue::List(items) => Ok(PropertyValue::List(
                items
                    .iter()
                    .map(|item| item.unwrap(ctx))
                    .collect::<ProviderResult<Vec<_>>>()?,
            )),
            PropertyValue::Object(bag) => Ok(PropertyValue::Object(unwrap_bag(bag, ctx)?)),
            plain => Ok(plain.clone()),
        }
    }

    /// String payload, if this is a plain string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Resolve every value of a bag
pub fn unwrap_bag(bag: &PropertyBag, ctx: UnwrapContext) -> ProviderResult<PropertyBag> {
    bag.iter()
        .map(|(key, value)| Ok((key.clone(), value.unwrap(ctx)?)))
        .collect()
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(serde_json::Number::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(PropertyValue::Number)
            .unwrap_or(PropertyValue::Null)
    }
}
