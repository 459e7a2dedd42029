//! Helpers over `serde_json::Value`, the value model shared by records,
//! attribute types and the column adapter.

pub use serde_json::Value as JsonValue;

pub type JsonMap = serde_json::Map<String, JsonValue>;

/// Returns `true` when the value is non-null and, for strings, arrays and
/// objects, non-empty.
///
/// `false`, `0` and whitespace-only strings count as present. This is
/// narrower than Rails' `present?`, which treats `false` and blank strings
/// as absent.
pub fn is_present(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(map) => !map.is_empty(),
        JsonValue::Bool(_) | JsonValue::Number(_) => true,
    }
}

/// Short name of the JSON kind, used in error messages.
pub fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presence() {
        assert!(!is_present(&JsonValue::Null));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!([])));
        assert!(!is_present(&json!({})));

        assert!(is_present(&json!(" ")));
        assert!(is_present(&json!(false)));
        assert!(is_present(&json!(0)));
        assert!(is_present(&json!([1])));
        assert!(is_present(&json!({"a": null})));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name(&json!(1.5)), "number");
        assert_eq!(type_name(&json!({"a": 1})), "object");
    }
}
