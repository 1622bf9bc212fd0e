//! Structural validation of untyped state blobs.
//!
//! Every load boundary parses JSON into a [`serde_json::Value`] first and
//! only deserializes into typed state once these checks pass. Validators
//! never fail; they answer `false` for anything malformed.

use chrono::DateTime;
use serde_json::{Map, Value};

use super::state::{APP_STATE_VERSION, MIN_APP_STATE_VERSION};
use super::status::TrackingStatus;

fn is_timestamp(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok())
}

fn is_string(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_string)
}

fn is_status(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| TrackingStatus::ALL.iter().any(|t| t.as_str() == s))
}

/// Check that `value` is a well-formed item tracking record.
#[must_use]
pub fn is_item_tracking_state(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let id_ok = obj
        .get("itemId")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty());
    id_ok && is_status(obj.get("status")) && is_timestamp(obj.get("updatedAt"))
}

fn items_valid(items: &Map<String, Value>) -> bool {
    items.values().all(is_item_tracking_state)
}

/// Check that `value` is a well-formed file tracking record, including
/// every nested item.
#[must_use]
pub fn is_file_tracking_state(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    is_string(obj.get("sourcePath"))
        && is_string(obj.get("contentHash"))
        && is_timestamp(obj.get("createdAt"))
        && is_timestamp(obj.get("updatedAt"))
        && obj
            .get("items")
            .and_then(Value::as_object)
            .is_some_and(items_valid)
}

/// Check that `value` is a well-formed app state: a supported integer
/// version and a map of valid file states.
#[must_use]
pub fn is_app_state(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let version_ok = obj.get("version").and_then(Value::as_u64).is_some_and(|v| {
        v >= u64::from(MIN_APP_STATE_VERSION) && v <= u64::from(APP_STATE_VERSION)
    });
    version_ok
        && obj
            .get("files")
            .and_then(Value::as_object)
            .is_some_and(|files| files.values().all(is_file_tracking_state))
}

/// Describe the first structural problem in a file state blob.
///
/// Returns `None` when [`is_file_tracking_state`] would return true.
#[must_use]
pub fn describe_file_state_problem(value: &Value) -> Option<String> {
    let Some(obj) = value.as_object() else {
        return Some("state is not an object".to_string());
    };
    for field in ["sourcePath", "contentHash"] {
        if !is_string(obj.get(field)) {
            return Some(format!("'{field}' must be a string"));
        }
    }
    for field in ["createdAt", "updatedAt"] {
        if !is_timestamp(obj.get(field)) {
            return Some(format!("'{field}' must be an RFC 3339 timestamp"));
        }
    }
    let Some(items) = obj.get("items").and_then(Value::as_object) else {
        return Some("'items' must be an object".to_string());
    };
    items
        .iter()
        .find(|(_, item)| !is_item_tracking_state(item))
        .map(|(key, _)| format!("item '{key}' is malformed"))
}
