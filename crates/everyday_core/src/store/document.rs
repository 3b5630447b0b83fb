//! Raw document shape shared by every collection.

use super::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Primary key field present in every document.
pub const ID_FIELD: &str = "_id";

/// One schemaless JSON object keyed by its `_id` string.
///
/// Documents are moved between stores without typed mapping, so a record
/// written by an older schema survives a copy unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    fields: Map<String, Value>,
}

impl Document {
    /// Wraps a JSON value, requiring an object with a string `_id`.
    pub fn from_value(value: Value) -> StoreResult<Self> {
        let Value::Object(fields) = value else {
            return Err(StoreError::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        };
        match fields.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => Ok(Self {
                id: id.clone(),
                fields,
            }),
            Some(_) => Err(StoreError::InvalidDocument(format!(
                "`{ID_FIELD}` must be a non-empty string"
            ))),
            None => Err(StoreError::InvalidDocument(format!(
                "document is missing `{ID_FIELD}`"
            ))),
        }
    }

    /// Serializes a typed entity into a document.
    pub fn from_entity<T: Serialize>(entity: &T) -> StoreResult<Self> {
        let value = serde_json::to_value(entity)
            .map_err(|err| StoreError::InvalidDocument(err.to_string()))?;
        Self::from_value(value)
    }

    /// Maps this document onto a typed entity.
    pub fn to_entity<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub(crate) fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(&self.fields)
            .map_err(|err| StoreError::InvalidDocument(err.to_string()))
    }

    /// Decodes a stored body, checking it against the key it was stored under.
    pub(crate) fn parse_stored(collection: &str, doc_id: String, body: &str) -> StoreResult<Self> {
        let malformed = |id: String, message: String| StoreError::MalformedDocument {
            collection: collection.to_string(),
            id,
            message,
        };

        let value: Value =
            serde_json::from_str(body).map_err(|err| malformed(doc_id.clone(), err.to_string()))?;
        let document =
            Self::from_value(value).map_err(|err| malformed(doc_id.clone(), err.to_string()))?;
        if document.id() != doc_id {
            return Err(malformed(
                doc_id,
                format!("body `{ID_FIELD}` is `{}`", document.id()),
            ));
        }
        Ok(document)
    }
}
