//! Response envelope and entity types for the Topz API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single record. Field order follows the response body and values are
/// passed through untouched; only `id` is expected on every record.
pub type Entity = Map<String, Value>;

/// Collection envelope returned by `GET /api/v1.0/odata/{entity}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub total_size: Option<u64>,

    #[serde(default)]
    pub done: Option<bool>,

    #[serde(default)]
    pub objects: Vec<Entity>,
}

impl QueryResult {
    /// Total matching records, falling back to the page size when the API
    /// omits `totalSize`
    pub fn total(&self) -> u64 {
        self.total_size.unwrap_or(self.objects.len() as u64)
    }

    /// Whether no further pages remain. Missing `done` means complete.
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(true)
    }
}

/// Entity sets exposed through dedicated tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitySet {
    Order,
    PaymentTerm,
}

impl EntitySet {
    /// Path segment under `/api/v1.0/odata/`
    pub fn path(&self) -> &'static str {
        match self {
            EntitySet::Order => "order",
            EntitySet::PaymentTerm => "payment_term",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_envelope_preserves_field_order() {
        let body = json!({
            "totalSize": 2,
            "done": false,
            "objects": [
                {"id": 7, "name": "Gordon Square", "total": 310000.5, "customer": null},
                {"id": "8", "nested": {"a": 1}}
            ]
        });

        let result: QueryResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.total(), 2);
        assert!(!result.is_done());
        assert_eq!(result.objects.len(), 2);

        let keys: Vec<&str> = result.objects[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "total", "customer"]);
        assert_eq!(result.objects[1]["id"], json!("8"));
        assert_eq!(result.objects[1]["nested"], json!({"a": 1}));
    }

    #[test]
    fn test_defaults_when_metadata_missing() {
        let result: QueryResult =
            serde_json::from_value(json!({"objects": [{"id": 1}, {"id": 2}, {"id": 3}]})).unwrap();
        assert_eq!(result.total(), 3);
        assert!(result.is_done());
    }

    #[test]
    fn test_entity_set_paths() {
        assert_eq!(EntitySet::Order.path(), "order");
        assert_eq!(EntitySet::PaymentTerm.path(), "payment_term");
    }
}
