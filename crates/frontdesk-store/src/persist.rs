//! JSON persistence of the mock data document.

use crate::error::StoreError;
use frontdesk_types::MockData;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Default location of the persisted data file.
pub const DEFAULT_DATA_FILE: &str = "mock_data_outputs/mock_data.json";

const REQUIRED_KEYS: [&str; 4] = ["customers", "appointments", "orders", "sample_data"];
const REQUIRED_CUSTOMER_FIELDS: [&str; 5] = ["id", "name", "phone", "email", "joined_date"];

/// Checks that a parsed document has the shape of [`MockData`].
///
/// All four top-level keys must be lists, and the first customer (when
/// present) must carry every customer field.
pub fn validate_structure(value: &Value) -> Result<(), StoreError> {
    let object = value
        .as_object()
        .ok_or_else(|| StoreError::InvalidStructure("document is not an object".to_string()))?;

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(StoreError::InvalidStructure(format!(
            "missing required keys: {:?}",
            missing
        )));
    }

    let not_lists: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object[*key].is_array())
        .collect();
    if !not_lists.is_empty() {
        return Err(StoreError::InvalidStructure(format!(
            "required keys must be lists: {:?}",
            not_lists
        )));
    }

    if let Some(first) = object["customers"].as_array().and_then(|c| c.first()) {
        let missing_fields: Vec<&str> = REQUIRED_CUSTOMER_FIELDS
            .iter()
            .copied()
            .filter(|field| first.get(*field).is_none())
            .collect();
        if !missing_fields.is_empty() {
            return Err(StoreError::InvalidStructure(format!(
                "customer missing required fields: {:?}",
                missing_fields
            )));
        }
    }

    Ok(())
}

/// Parses and validates a persisted document.
///
/// Stored sample rows are discarded unread; callers rebuild them from the
/// records.
pub fn parse(bytes: &[u8]) -> Result<MockData, StoreError> {
    let mut value: Value = serde_json::from_slice(bytes)?;
    validate_structure(&value)?;
    value["sample_data"] = Value::Array(Vec::new());
    Ok(serde_json::from_value(value)?)
}

/// Reads and validates the data file at `path`.
pub async fn load(path: &Path) -> Result<MockData, StoreError> {
    let bytes = tokio::fs::read(path).await?;
    let data = parse(&bytes)?;
    tracing::info!(
        path = %path.display(),
        customers = data.customers.len(),
        appointments = data.appointments.len(),
        orders = data.orders.len(),
        "loaded mock data"
    );
    Ok(data)
}

/// Writes `data` as pretty-printed JSON, creating the parent directory.
pub async fn save(data: &MockData, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(data)?;
    tokio::fs::write(path, json).await?;
    tracing::info!(path = %path.display(), "saved mock data");
    Ok(())
}

/// Moves an unreadable data file aside as `<name>.<timestamp>.bak` and
/// returns the new location.
pub async fn backup(path: &Path, now: NaiveDateTime) -> Result<PathBuf, StoreError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mock_data.json".to_string());
    let target = path.with_file_name(format!("{}.{}.bak", name, now.format("%Y%m%dT%H%M%S")));
    tokio::fs::rename(path, &target).await?;
    tracing::warn!(path = %path.display(), backup = %target.display(), "moved unreadable mock data aside");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_empty_document() {
        let value = json!({"customers": [], "appointments": [], "orders": [], "sample_data": []});
        assert!(validate_structure(&value).is_ok());
    }

    #[test]
    fn rejects_missing_keys() {
        let value = json!({"customers": [], "appointments": []});
        let err = validate_structure(&value).unwrap_err();
        assert!(err.to_string().contains("orders"));
        assert!(err.to_string().contains("sample_data"));
    }

    #[test]
    fn rejects_non_list_values() {
        let value = json!({"customers": {}, "appointments": [], "orders": [], "sample_data": []});
        let err = validate_structure(&value).unwrap_err();
        assert!(err.to_string().contains("must be lists"));
    }

    #[test]
    fn rejects_incomplete_first_customer() {
        let value = json!({
            "customers": [{"id": "CUST0000", "name": "A"}],
            "appointments": [],
            "orders": [],
            "sample_data": []
        });
        let err = validate_structure(&value).unwrap_err();
        assert!(err.to_string().contains("phone"));
    }

    #[test]
    fn parse_ignores_stored_sample_rows() {
        let bytes = br#"{
            "customers": [],
            "appointments": [],
            "orders": [],
            "sample_data": [{"Customer": "stale", "Appointments": "not a list"}]
        }"#;
        let data = parse(bytes).unwrap();
        assert!(data.sample_data.is_empty());
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(matches!(parse(b"{not json"), Err(StoreError::Json(_))));
    }
}
