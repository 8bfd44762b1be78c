//! Conversion between records and the values stored in the tree.
//!
//! A record lives at `collection/id`, so the id is the key and not part of the stored value.
//! The store rejects undefined values, so every null field is dropped before writing.

use pims_remote::tree;
use serde_json::{Map, Value};

use crate::error::DatabaseError;
use crate::Record;

pub fn encode<R: Record>(record: &R) -> Result<Map<String, Value>, DatabaseError> {
    let value = serde_json::to_value(record).map_err(|source| DatabaseError::Encode {
        collection: R::COLLECTION,
        key: record.id().to_owned(),
        source,
    })?;
    let Value::Object(mut fields) = value else {
        return Err(DatabaseError::NotAnObject {
            collection: R::COLLECTION,
            key: record.id().to_owned(),
        });
    };
    fields.remove("id");
    Ok(strip_undefined(fields))
}

#[must_use]
pub fn strip_undefined(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .filter_map(|(key, value)| tree::normalize(value).map(|value| (key, value)))
        .collect()
}

pub fn decode<R: Record>(key: &str, value: Value) -> Result<R, DatabaseError> {
    let Value::Object(mut fields) = value else {
        return Err(DatabaseError::NotAnObject {
            collection: R::COLLECTION,
            key: key.to_owned(),
        });
    };
    fields.insert("id".to_owned(), Value::String(key.to_owned()));
    serde_json::from_value(Value::Object(fields)).map_err(|source| DatabaseError::Decode {
        collection: R::COLLECTION,
        key: key.to_owned(),
        source,
    })
}

/// Decodes every child of a collection value.
///
/// A collection written as a list comes back as an array; its indices are the keys and holes
/// are skipped.
#[must_use]
pub fn decode_children<R: Record>(collection: Option<Value>) -> Vec<Result<R, DatabaseError>> {
    match collection {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(children)) => children
            .into_iter()
            .map(|(key, value)| decode(&key, value))
            .collect(),
        Some(Value::Array(children)) => children
            .into_iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(index, value)| decode(&index.to_string(), value))
            .collect(),
        Some(_) => vec![Err(DatabaseError::NotAnObject {
            collection: R::COLLECTION,
            key: String::new(),
        })],
    }
}
