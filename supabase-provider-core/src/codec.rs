//! Codec between property bags and typed request/response shapes
//!
//! Decoding unwraps secret/output/reference/computed wrappers and then
//! deserializes through `serde_json`; encoding is the inverse. Keys whose
//! resolved value is null are treated as absent, so an optional field that is
//! still computed during preview simply disappears instead of failing the
//! decode.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, ProviderResult};
use crate::property::{PropertyBag, PropertyValue, UnwrapContext, unwrap_bag};

/// Decode a property bag into a typed shape
pub fn decode<T: DeserializeOwned>(bag: &PropertyBag, ctx: UnwrapContext) -> ProviderResult<T> {
    let resolved = unwrap_bag(bag, ctx)?;
    let mut object = serde_json::Map::with_capacity(resolved.len());
    for (key, value) in &resolved {
        if matches!(value, PropertyValue::Null) {
            continue;
        }
        object.insert(key.clone(), value_to_json(value)?);
    }
    serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| ProviderError::SchemaMismatch(e.to_string()))
}

/// Encode a typed shape into a property bag. The value must serialize to an
/// object; the remote-assigned id travels beside the bag, never inside it.
pub fn encode<T: Serialize>(value: &T) -> ProviderResult<PropertyBag> {
    let json =
        serde_json::to_value(value).map_err(|e| ProviderError::SchemaMismatch(e.to_string()))?;
    match json_to_value(json) {
        PropertyValue::Object(bag) => Ok(bag),
        other => Err(ProviderError::SchemaMismatch(format!(
            "expected an object, got {other:?}"
        ))),
    }
}

/// Convert a plain (already unwrapped) property value to JSON
fn value_to_json(value: &PropertyValue) -> ProviderResult<serde_json::Value> {
    match value {
        PropertyValue::Null => Ok(serde_json::Value::Null),
        PropertyValue::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        PropertyValue::Number(n) => Ok(serde_json::Value::Number(n.clone())),
        PropertyValue::String(s) => Ok(serde_json::Value::String(s.clone())),
        PropertyValue::List(items) => Ok(serde_json::Value::Array(
            items
                .iter()
                .map(value_to_json)
                .collect::<ProviderResult<Vec<_>>>()?,
        )),
        PropertyValue::Object(bag) => {
            let mut object = serde_json::Map::with_capacity(bag.len());
            for (key, value) in bag {
                object.insert(key.clone(), value_to_json(value)?);
            }
            Ok(serde_json::Value::Object(object))
        }
        wrapper => Err(ProviderError::Unwrap(format!(
            "wrapper value reached the codec unresolved: {wrapper:?}"
        ))),
    }
}

/// Convert a JSON value to a plain property value
fn json_to_value(json: serde_json::Value) -> PropertyValue {
    match json {
        serde_json::Value::Null => PropertyValue::Null,
        serde_json::Value::Bool(b) => PropertyValue::Bool(b),
        serde_json::Value::Number(n) => PropertyValue::Number(n),
        serde_json::Value::String(s) => PropertyValue::String(s),
        serde_json::Value::Array(items) => {
            PropertyValue::List(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(object) => PropertyValue::Object(
            object
                .into_iter()
                .map(|(key, value)| (key, json_to_value(value)))
                .collect(),
        ),
    }
}
