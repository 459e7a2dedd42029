//! Attribute types.
//!
//! A declared attribute may name a type tag. The matching [`AttributeType`]
//! coerces the stored (or default) value every time the attribute is read and
//! normalizes incoming values before they are stored. Tags are resolved
//! through a process-wide registry preloaded with the built-in types below;
//! applications add their own with [`register_attribute_type`].

use super::{JsonValue, RecordError, RecordResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use serde_json::Number;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Coercion logic for one semantic type.
pub trait AttributeType: Send + Sync {
    /// Tag the type is registered under, e.g. `"float"`.
    fn name(&self) -> &str;

    /// Coerces a stored or default value when the attribute is read.
    fn cast(&self, value: &JsonValue) -> JsonValue;

    /// Normalizes a value before it is stored.
    fn deserialize(&self, value: &JsonValue) -> JsonValue {
        self.cast(value)
    }
}

/// Registry of attribute types keyed by tag.
pub struct AttributeTypeRegistry {
    types: HashMap<String, Arc<dyn AttributeType>>,
}

impl AttributeTypeRegistry {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Registry holding every built-in type.
    pub fn with_default_types() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(StringType));
        registry.register(Arc::new(IntegerType));
        registry.register(Arc::new(FloatType));
        registry.register(Arc::new(BooleanType));
        registry.register(Arc::new(DateType));
        registry.register(Arc::new(DateTimeType));
        registry.register(Arc::new(UuidType));
        registry.register(Arc::new(JsonType));

        registry
    }

    /// Registers a type under its own name, replacing any previous entry.
    pub fn register(&mut self, attribute_type: Arc<dyn AttributeType>) {
        let name = attribute_type.name().to_string();
        debug!(attribute_type = %name, "registered attribute type");
        self.types.insert(name, attribute_type);
    }

    pub fn lookup(&self, tag: &str) -> RecordResult<Arc<dyn AttributeType>> {
        self.types
            .get(tag)
            .cloned()
            .ok_or_else(|| RecordError::UnknownType(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }
}

impl Default for AttributeTypeRegistry {
    fn default() -> Self {
        Self::with_default_types()
    }
}

lazy_static! {
    static ref GLOBAL_TYPES: RwLock<AttributeTypeRegistry> =
        RwLock::new(AttributeTypeRegistry::with_default_types());
}

/// Adds a type to the process-wide registry.
///
/// Must happen before any record type declaring the tag is built.
pub fn register_attribute_type<T>(attribute_type: T) -> RecordResult<()>
where
    T: AttributeType + 'static,
{
    GLOBAL_TYPES.write()?.register(Arc::new(attribute_type));
    Ok(())
}

/// Resolves a tag against the process-wide registry.
pub fn lookup_attribute_type(tag: &str) -> RecordResult<Arc<dyn AttributeType>> {
    GLOBAL_TYPES.read()?.lookup(tag)
}

// ============================================================================
// Built-in types
// ============================================================================

/// Text. Booleans become `"t"`/`"f"`, numbers and structures their JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl AttributeType for StringType {
    fn name(&self) -> &str {
        "string"
    }

    fn cast(&self, value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::Null => JsonValue::Null,
            JsonValue::String(_) => value.clone(),
            JsonValue::Bool(true) => JsonValue::from("t"),
            JsonValue::Bool(false) => JsonValue::from("f"),
            JsonValue::Number(n) => JsonValue::String(n.to_string()),
            JsonValue::Array(_) | JsonValue::Object(_) => JsonValue::String(value.to_string()),
        }
    }
}

/// 64-bit integer. Fractions truncate; unparseable or blank input becomes null.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerType;

impl AttributeType for IntegerType {
    fn name(&self) -> &str {
        "integer"
    }

    fn cast(&self, value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(truncate))
                .map(JsonValue::from)
                .unwrap_or(JsonValue::Null),
            JsonValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(truncate))
                    .map(JsonValue::from)
                    .unwrap_or(JsonValue::Null)
            }
            JsonValue::Bool(b) => JsonValue::from(i64::from(*b)),
            _ => JsonValue::Null,
        }
    }
}

// Out-of-range values become null rather than saturating at the bounds.
fn truncate(f: f64) -> Option<i64> {
    let f = f.trunc();
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

/// Double precision float. Unparseable, blank or non-finite input becomes null.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl AttributeType for FloatType {
    fn name(&self) -> &str {
        "float"
    }

    fn cast(&self, value: &JsonValue) -> JsonValue {
        let float = match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse::<f64>().ok(),
            JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };

        float
            .and_then(Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

const FALSE_STRINGS: [&str; 7] = ["0", "f", "F", "false", "FALSE", "off", "OFF"];

/// Boolean. The empty string is null; `0` and the usual false spellings are
/// `false`; anything else non-null is `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl AttributeType for BooleanType {
    fn name(&self) -> &str {
        "boolean"
    }

    fn cast(&self, value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::Null => JsonValue::Null,
            JsonValue::Bool(_) => value.clone(),
            JsonValue::String(s) if s.is_empty() => JsonValue::Null,
            JsonValue::String(s) => JsonValue::Bool(!FALSE_STRINGS.contains(&s.as_str())),
            JsonValue::Number(n) => JsonValue::Bool(n.as_f64() != Some(0.0)),
            JsonValue::Array(_) | JsonValue::Object(_) => JsonValue::Bool(true),
        }
    }
}

/// Calendar date, normalized to `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl AttributeType for DateType {
    fn name(&self) -> &str {
        "date"
    }

    fn cast(&self, value: &JsonValue) -> JsonValue {
        let JsonValue::String(s) = value else {
            return JsonValue::Null;
        };
        let s = s.trim();

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
            .map(|d| JsonValue::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(JsonValue::Null)
    }
}

/// Timestamp, normalized to RFC 3339 in UTC. Numbers are unix seconds and
/// offset-less strings are read as UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeType;

impl AttributeType for DateTimeType {
    fn name(&self) -> &str {
        "datetime"
    }

    fn cast(&self, value: &JsonValue) -> JsonValue {
        let parsed = match value {
            JsonValue::String(s) => parse_datetime(s.trim()),
            JsonValue::Number(n) => n
                .as_i64()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            _ => None,
        };

        parsed
            .map(|dt| JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            .unwrap_or(JsonValue::Null)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}

/// UUID, normalized to lowercase hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidType;

impl AttributeType for UuidType {
    fn name(&self) -> &str {
        "uuid"
    }

    fn cast(&self, value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::String(s) => uuid::Uuid::parse_str(s.trim())
                .map(|u| JsonValue::String(u.hyphenated().to_string()))
                .unwrap_or(JsonValue::Null),
            _ => JsonValue::Null,
        }
    }
}

/// Arbitrary JSON, stored untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonType;

impl AttributeType for JsonType {
    fn name(&self) -> &str {
        "json"
    }

    fn cast(&self, value: &JsonValue) -> JsonValue {
        value.clone()
    }
}
