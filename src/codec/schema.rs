//! Declarative field schemas and the generic JSON engine
//!
//! Each entity kind describes its wire shape once, as a table of
//! [`Field`]s: the JSON key, how to read the value out of the entity, and
//! how to feed a JSON value into the entity's builder. [`encode`] and
//! [`decode`] walk that table, so both directions always agree on keys.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::validation::ValidationError;

/// Errors raised while turning JSON back into entities
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object for {entity}")]
    NotAnObject { entity: &'static str },

    #[error("expected a JSON array of {entity} records")]
    NotAnArray { entity: &'static str },

    #[error("field `{key}` has the wrong type, expected {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Feeds one decoded JSON value into a builder
pub type Decoder<B> = fn(B, &Value) -> Result<B, CodecError>;

/// One entry of an entity's wire schema
pub struct Field<E, B> {
    /// JSON key, written and read verbatim
    pub key: &'static str,
    /// Produces the JSON value for this key
    pub encode: fn(&E) -> Value,
    /// `None` for derived values: written for readers, skipped on decode
    pub decode: Option<Decoder<B>>,
}

/// Wire schema of one entity kind
pub trait Schema {
    type Entity: 'static;
    type Builder: Default + 'static;

    /// Entity name used in error messages
    const NAME: &'static str;

    /// Fields in the order they are written
    fn fields() -> &'static [Field<Self::Entity, Self::Builder>];

    /// Terminal step once every present key has been fed to the builder
    ///
    /// `raw` is the whole source object, for flags that select the build
    /// mode rather than set a field.
    fn finish(builder: Self::Builder, raw: &Map<String, Value>)
        -> Result<Self::Entity, CodecError>;
}

/// Encode one entity as a JSON object
pub fn encode<S: Schema>(entity: &S::Entity) -> Value {
    let mut object = Map::new();
    for field in S::fields() {
        object.insert(field.key.to_string(), (field.encode)(entity));
    }
    Value::Object(object)
}

/// Encode an optional entity, `None` becoming JSON `null`
pub fn encode_opt<S: Schema>(entity: Option<&S::Entity>) -> Value {
    entity.map_or(Value::Null, encode::<S>)
}

/// Encode a collection as a JSON array
pub fn encode_list<S: Schema>(entities: &[S::Entity]) -> Value {
    Value::Array(entities.iter().map(encode::<S>).collect())
}

/// Decode one entity
///
/// JSON `null` yields `Ok(None)`. Unknown keys and keys holding `null` are
/// skipped; a required field left unset fails in the builder exactly as it
/// would when building by hand.
pub fn decode<S: Schema>(value: &Value) -> Result<Option<S::Entity>, CodecError> {
    let object = match value {
        Value::Null => return Ok(None),
        Value::Object(object) => object,
        _ => return Err(CodecError::NotAnObject { entity: S::NAME }),
    };

    let fields = S::fields();
    let mut builder = S::Builder::default();
    for (key, value) in object {
        if value.is_null() {
            continue;
        }
        let decoder = fields
            .iter()
            .find(|f| f.key == key.as_str())
            .and_then(|f| f.decode);
        if let Some(decoder) = decoder {
            builder = decoder(builder, value)?;
        }
    }

    S::finish(builder, object).map(Some)
}

/// Decode a JSON array, `null` meaning an empty collection
///
/// `null` elements are dropped.
pub fn decode_list<S: Schema>(value: &Value) -> Result<Vec<S::Entity>, CodecError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            let mut entities = Vec::with_capacity(items.len());
            for item in items {
                if let Some(entity) = decode::<S>(item)? {
                    entities.push(entity);
                }
            }
            Ok(entities)
        }
        _ => Err(CodecError::NotAnArray { entity: S::NAME }),
    }
}

/// Render a collection as the pretty-printed document stored on disk
pub fn to_document<S: Schema>(entities: &[S::Entity]) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(&encode_list::<S>(entities))?)
}

/// Parse a stored document; blank text is an empty collection
pub fn from_document<S: Schema>(text: &str) -> Result<Vec<S::Entity>, CodecError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(text)?;
    decode_list::<S>(&value)
}

// ---------------------------------------------------------------------------
// Value readers shared by the per-entity schemas
// ---------------------------------------------------------------------------

/// Read a string; numbers are accepted and rendered as text
pub fn read_string(key: &'static str, value: &Value) -> Result<String, CodecError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(CodecError::WrongType {
            key,
            expected: "string",
        }),
    }
}

pub fn read_f64(key: &'static str, value: &Value) -> Result<f64, CodecError> {
    value.as_f64().ok_or(CodecError::WrongType {
        key,
        expected: "number",
    })
}

pub fn read_i64(key: &'static str, value: &Value) -> Result<i64, CodecError> {
    value.as_i64().ok_or(CodecError::WrongType {
        key,
        expected: "integer",
    })
}

pub fn read_bool(key: &'static str, value: &Value) -> Result<bool, CodecError> {
    value.as_bool().ok_or(CodecError::WrongType {
        key,
        expected: "boolean",
    })
}

/// Read an epoch-milliseconds timestamp
pub fn read_millis(key: &'static str, value: &Value) -> Result<DateTime<Utc>, CodecError> {
    let millis = read_i64(key, value)?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(CodecError::WrongType {
            key,
            expected: "epoch milliseconds",
        })
}

/// Write a timestamp as epoch milliseconds, 0 when absent
pub fn millis(date: Option<DateTime<Utc>>) -> Value {
    Value::from(date.map_or(0, |d| d.timestamp_millis()))
}
