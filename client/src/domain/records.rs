//! Wire records mirroring the store's JSON field names.
//!
//! The hosted store is loosely typed: any field may be absent or hold the
//! wrong type. Decoding therefore never fails a record — missing or
//! malformed fields fall back to their defaults (empty strings, zero
//! timestamps) and presentation decides how to render them.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

/// Question record as stored under `questions/{questionId}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionRecord {
    /// Merged `"<category>: <title>"` field chosen at creation.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Whole seconds since the epoch, set by the submitting client.
    pub timestamp: i64,
    /// Identifier of the owning user.
    pub user_id: String,
}

/// Reply record as stored under `replies/{questionId}/{replyId}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplyRecord {
    /// Free-text reply body.
    pub text: String,
    /// Identifier of the authoring doctor.
    pub doctor_id: String,
    /// Display name captured by value at submission time.
    pub doctor_name: String,
    /// Whole seconds since the epoch.
    pub timestamp: i64,
}

/// Profile record as stored under `users/{userId}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Display name chosen at registration.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role tag, `"Doctor"` or `"Patient"`.
    pub user_type: String,
}

/// Decode the children of a store node into keyed records.
///
/// A `None` snapshot, a non-object node, and an empty object all decode to an
/// empty list. A child that fails to decode is kept with defaulted fields so
/// one malformed record never hides its siblings.
#[must_use]
pub fn decode_children<T>(snapshot: Option<Value>) -> Vec<(String, T)>
where
    T: DeserializeOwned + Default,
{
    let Some(Value::Object(children)) = snapshot else {
        return Vec::new();
    };
    children
        .into_iter()
        .map(|(key, child)| {
            let record = serde_json::from_value(child).unwrap_or_else(|err| {
                warn!(key = %key, error = %err, "malformed store record, using defaults");
                T::default()
            });
            (key, record)
        })
        .collect()
}

/// Decode a single record node, defaulting malformed fields.
///
/// Returns `None` only when nothing exists at the path.
#[must_use]
pub fn decode_record<T>(snapshot: Option<Value>) -> Option<T>
where
    T: DeserializeOwned + Default,
{
    let value = snapshot?;
    if value.is_null() {
        return None;
    }
    Some(serde_json::from_value(value).unwrap_or_else(|err| {
        warn!(error = %err, "malformed store record, using defaults");
        T::default()
    }))
}
