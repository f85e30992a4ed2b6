//! Index mapping (schema) of a single index.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The mapping of one index, as returned under `<index>.mappings` by
/// `GET <index>/_mapping`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMapping {
    pub index_name: String,
    pub mappings: Map<String, Value>,
}

/// One field of a mapping, flattened from the raw JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    /// Declared type; objects without an explicit type report `object`.
    pub field_type: String,
    pub analyzer: Option<String>,
    pub search_analyzer: Option<String>,
    pub normalizer: Option<String>,
    /// False when the mapping sets `"index": false`.
    pub searchable: bool,
    pub doc_values: bool,
    pub stored: bool,
    /// Sub-fields declared under `properties`.
    pub properties: Vec<FieldInfo>,
    /// Multi-fields declared under `fields`.
    pub multi_fields: Vec<FieldInfo>,
}

impl IndexMapping {
    /// Top-level fields sorted by name, or `None` when the mapping has no
    /// `properties` object.
    pub fn fields(&self) -> Option<Vec<FieldInfo>> {
        let properties = self.mappings.get("properties")?.as_object()?;
        Some(parse_fields(properties))
    }

    /// Number of fields including nested `properties`, not counting
    /// multi-fields.
    pub fn field_count(&self) -> usize {
        fn count(fields: &[FieldInfo]) -> usize {
            fields.iter().map(|f| 1 + count(&f.properties)).sum()
        }
        self.fields().map(|f| count(&f)).unwrap_or(0)
    }
}

fn parse_fields(properties: &Map<String, Value>) -> Vec<FieldInfo> {
    let mut fields: Vec<FieldInfo> = properties
        .iter()
        .filter_map(|(name, value)| value.as_object().map(|obj| parse_field(name, obj)))
        .collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));
    fields
}

fn parse_field(name: &str, obj: &Map<String, Value>) -> FieldInfo {
    let string = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    let flag = |key: &str, default: bool| match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s != "false",
        _ => default,
    };
    let nested = |key: &str| {
        obj.get(key)
            .and_then(Value::as_object)
            .map(parse_fields)
            .unwrap_or_default()
    };

    let properties = nested("properties");
    let field_type = string("type").unwrap_or_else(|| {
        if properties.is_empty() {
            String::new()
        } else {
            "object".to_string()
        }
    });

    FieldInfo {
        name: name.to_string(),
        field_type,
        analyzer: string("analyzer"),
        search_analyzer: string("search_analyzer"),
        normalizer: string("normalizer"),
        searchable: flag("index", true),
        doc_values: flag("doc_values", true),
        stored: flag("store", false),
        properties,
        multi_fields: nested("fields"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> IndexMapping {
        IndexMapping {
            index_name: "logs".to_string(),
            mappings: value.as_object().unwrap().clone(),
        }
    }

    #[test]
    fn test_fields_flatten_nested_and_multi_fields() {
        let m = mapping(json!({
            "properties": {
                "title": {
                    "type": "text",
                    "analyzer": "english",
                    "fields": {"raw": {"type": "keyword"}}
                },
                "user": {
                    "properties": {
                        "id": {"type": "long", "index": false},
                        "name": {"type": "keyword", "normalizer": "lower"}
                    }
                },
                "created": {"type": "date", "doc_values": false, "store": true}
            }
        }));

        let fields = m.fields().unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["created", "title", "user"]);

        let created = &fields[0];
        assert!(!created.doc_values);
        assert!(created.stored);

        let title = &fields[1];
        assert_eq!(title.analyzer.as_deref(), Some("english"));
        assert_eq!(title.multi_fields[0].name, "raw");

        let user = &fields[2];
        assert_eq!(user.field_type, "object");
        assert!(!user.properties[0].searchable);
        assert_eq!(user.properties[1].normalizer.as_deref(), Some("lower"));

        // title, user, user.id, user.name, created
        assert_eq!(m.field_count(), 5);
    }

    #[test]
    fn test_string_index_flag() {
        let m = mapping(json!({"properties": {"a": {"type": "text", "index": "false"}}}));
        assert!(!m.fields().unwrap()[0].searchable);
    }

    #[test]
    fn test_missing_properties() {
        let m = mapping(json!({"dynamic": "strict"}));
        assert!(m.fields().is_none());
        assert_eq!(m.field_count(), 0);
    }
}
