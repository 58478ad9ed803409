//! The contract every managed entity implements.
//!
//! A [`Resource`] is the local (display/edit) form of a record. It owns the
//! mapping to and from its wire form, the payloads sent for creates and
//! updates, and the predicates used when a collection is filtered or sorted.
//! [`ResourceStore`](crate::application::ResourceStore) is written once
//! against this trait and reused for every collection in the dashboard.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::{DomainError, Filter, SortValue};

/// Where a freshly created record lands in the local collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Append,
    /// Most recent first.
    Prepend,
}

/// HTTP verb used for updates. Some endpoints only accept POST with a
/// `_method=PUT` override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    Put,
    Post,
}

/// Request body for a create, update, or action.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

impl Payload {
    pub fn json<T: Serialize>(value: &T) -> Payload {
        // Plain data structs with string keys cannot fail to serialize.
        Payload::Json(serde_json::to_value(value).unwrap_or(serde_json::Value::Null))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(Upload),
}

impl FormPart {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(name: &str, upload: Upload) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::File(upload),
        }
    }
}

/// A file picked by the operator, already read into memory.
#[derive(Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Target of an entity-specific operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRoute {
    /// `POST {endpoint}/{id}/{path}`
    Item { id: String, path: &'static str },
    /// `POST {endpoint}/{path}`
    Collection { path: &'static str },
}

/// An operation beyond plain CRUD (mark as read, register attendee, ...).
pub trait ResourceAction: Debug + Send + Sync {
    fn route(&self) -> ActionRoute;
    fn payload(&self) -> Payload {
        Payload::Empty
    }
}

/// Action type for collections that have no custom operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoAction {}

impl ResourceAction for NoAction {
    fn route(&self) -> ActionRoute {
        match *self {}
    }
}

pub trait Resource: Clone + Debug + Send + Sync + 'static {
    /// The record as the backend transmits it.
    type Wire: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static;
    /// Client-editable fields of a new record.
    type Draft: Debug + Send + Sync;
    /// Sparse set of field changes; absent fields are left untouched.
    type Changes: Debug + Send + Sync;
    type Action: ResourceAction;

    /// Collection name, used in logs and as the export file stem.
    const NAME: &'static str;
    /// Collection path relative to the API base URL.
    const ENDPOINT: &'static str;
    /// Path the collection is listed from, when it differs from `ENDPOINT`.
    const LIST_ENDPOINT: &'static str = Self::ENDPOINT;
    /// Keys [`Resource::sort_value`] understands.
    const SORT_KEYS: &'static [&'static str];
    const INSERT: InsertPosition = InsertPosition::Append;
    const UPDATE_METHOD: UpdateMethod = UpdateMethod::Put;

    fn id(&self) -> &str;
    fn from_wire(wire: Self::Wire) -> Self;
    fn to_wire(&self) -> Self::Wire;

    fn validate_draft(_draft: &Self::Draft) -> Result<(), DomainError> {
        Ok(())
    }
    fn validate_changes(_changes: &Self::Changes) -> Result<(), DomainError> {
        Ok(())
    }

    fn draft_payload(draft: &Self::Draft) -> Payload;
    fn changes_payload(changes: &Self::Changes) -> Payload;

    fn matches(&self, _filter: &Filter) -> bool {
        true
    }
    fn sort_value(&self, _key: &str) -> Option<SortValue> {
        None
    }

    /// Merges a successful update into the local record.
    ///
    /// `previous` is the local entry before the update, if one existed.
    fn reconcile(_previous: Option<&Self>, updated: Self, _changes: &Self::Changes) -> Self {
        updated
    }

    fn export_headers() -> &'static [&'static str];
    fn export_row(&self) -> Vec<String>;
}

/// Server-side behaviour for the in-memory deployment target.
pub trait Simulated: Resource {
    fn wire_id(wire: &Self::Wire) -> &str;
    fn wire_from_draft(id: String, draft: &Self::Draft, now: &str) -> Self::Wire;
    fn apply_changes(wire: &mut Self::Wire, changes: &Self::Changes, now: &str);

    fn apply_action(
        _wire: &mut Self::Wire,
        action: &Self::Action,
        _now: &str,
    ) -> Result<(), DomainError> {
        Err(DomainError::validation(format!(
            "{} does not support {:?}",
            Self::NAME,
            action
        )))
    }
}

/// Accepts an identifier sent either as a JSON string or a number.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(s) => Ok(s),
        RawId::Int(n) => Ok(n.to_string()),
        RawId::Float(n) if n.fract() == 0.0 => Ok((n as i64).to_string()),
        RawId::Float(n) => Err(de::Error::custom(format!("invalid identifier: {}", n))),
    }
}

pub fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}

/// Non-empty check shared by draft validators.
pub fn require(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        Err(DomainError::validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct IdHolder {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "optional_string_or_number")]
        other: Option<String>,
    }

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let p: IdHolder = serde_json::from_str(r#"{"id": 42, "other": "7"}"#).unwrap();
        assert_eq!(p.id, "42");
        assert_eq!(p.other.as_deref(), Some("7"));

        let p: IdHolder = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(p.id, "abc");
        assert!(p.other.is_none());
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("name", "  ").is_err());
        assert!(require("name", "Joe").is_ok());
    }
}
