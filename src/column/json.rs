use super::ColumnType;
use crate::collection::{RawValue, RecordCollection, RecordInput};
use crate::core::{JsonValue, RecordResult};
use crate::record::{AttributeEnumerable, EmbeddedRecord};

/// Values that have a canonical JSON form for storage. `None` is SQL NULL.
pub trait ToColumnJson {
    fn to_column_json(&self) -> Option<JsonValue>;
}

impl ToColumnJson for JsonValue {
    fn to_column_json(&self) -> Option<JsonValue> {
        (!self.is_null()).then(|| self.clone())
    }
}

impl ToColumnJson for EmbeddedRecord {
    fn to_column_json(&self) -> Option<JsonValue> {
        Some(JsonValue::Object(self.attributes_snapshot()))
    }
}

impl ToColumnJson for RecordCollection {
    fn to_column_json(&self) -> Option<JsonValue> {
        Some(self.to_serializable())
    }
}

impl ToColumnJson for RawValue {
    fn to_column_json(&self) -> Option<JsonValue> {
        match self {
            RawValue::Null => None,
            RawValue::Text(text) => Some(JsonValue::String(text.clone())),
            RawValue::Json(value) => value.to_column_json(),
            RawValue::Records(items) => Some(JsonValue::Array(
                items
                    .iter()
                    .map(|item| match item {
                        RecordInput::Record(record) => {
                            JsonValue::Object(record.attributes_snapshot())
                        }
                        RecordInput::Attributes(value) => value.clone(),
                    })
                    .collect(),
            )),
            RawValue::Collection(collection) => collection.to_column_json(),
        }
    }
}

impl<T> ToColumnJson for Option<T>
where
    T: ToColumnJson,
{
    fn to_column_json(&self) -> Option<JsonValue> {
        self.as_ref().and_then(ToColumnJson::to_column_json)
    }
}

/// Parses stored JSON text. Every other raw value is already structured and
/// passes through untouched.
pub fn decode_json(raw: RawValue) -> RecordResult<RawValue> {
    match raw {
        RawValue::Text(text) => Ok(RawValue::Json(serde_json::from_str(&text)?)),
        other => Ok(other),
    }
}

/// Encodes a value's canonical JSON form as text.
pub fn encode_json(value: &dyn ToColumnJson) -> RecordResult<Option<String>> {
    Ok(value
        .to_column_json()
        .map(|json| serde_json::to_string(&json))
        .transpose()?)
}

/// Plain JSON column: any JSON document, stored as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonColumn;

impl ColumnType for JsonColumn {
    type Value = JsonValue;

    fn type_tag(&self) -> &'static str {
        "json"
    }

    fn cast(&self, raw: RawValue) -> RecordResult<JsonValue> {
        Ok(raw.to_column_json().unwrap_or(JsonValue::Null))
    }

    fn deserialize(&self, raw: RawValue) -> RecordResult<JsonValue> {
        self.cast(decode_json(raw)?)
    }
}
