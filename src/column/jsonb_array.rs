use super::{ColumnType, decode_json};
use crate::collection::{RawValue, RecordCollection};
use crate::config::CastOptions;
use crate::core::RecordResult;
use crate::record::{EmbeddedModel, RecordType, RecordTypeRegistry};
use std::sync::RwLock;
use tracing::debug;

pub const JSONB_ARRAY_TYPE_TAG: &str = "jsonb_array";

/// The record type of a column's elements: either a name still to be looked
/// up in the [`RecordTypeRegistry`], or the resolved type.
#[derive(Debug, Clone)]
pub enum ChildType {
    Named(String),
    Resolved(RecordType),
}

/// Column type storing a JSON array of embedded records.
///
/// # Example
/// ```ignore
/// let column = JsonbArrayType::named("Address");
/// let addresses = column.deserialize(RawValue::from(r#"[{"city":"Oslo"}]"#))?;
/// ```
#[derive(Debug)]
pub struct JsonbArrayType {
    child: RwLock<ChildType>,
    options: CastOptions,
}

impl JsonbArrayType {
    pub fn new(record_type: &RecordType) -> Self {
        Self {
            child: RwLock::new(ChildType::Resolved(record_type.clone())),
            options: CastOptions::default(),
        }
    }

    /// Refers to the child type by name. The name is resolved on first use
    /// and the result kept for the adapter's lifetime.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            child: RwLock::new(ChildType::Named(name.into())),
            options: CastOptions::default(),
        }
    }

    /// Adapter for a type declared with `embedded_record!`.
    pub fn of<T: EmbeddedModel>() -> RecordResult<Self> {
        Ok(Self::new(&T::record_type()?))
    }

    pub fn with_options(mut self, options: CastOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CastOptions {
        &self.options
    }

    pub fn is_resolved(&self) -> RecordResult<bool> {
        Ok(matches!(&*self.child.read()?, ChildType::Resolved(_)))
    }

    /// The resolved child type. Fails with `UnresolvedType` while the
    /// configured name is unknown.
    pub fn child_type(&self) -> RecordResult<RecordType> {
        if let ChildType::Resolved(record_type) = &*self.child.read()? {
            return Ok(record_type.clone());
        }

        let mut child = self.child.write()?;
        let record_type = match &*child {
            ChildType::Resolved(record_type) => record_type.clone(),
            ChildType::Named(name) => {
                let record_type = RecordTypeRegistry::global().resolve(name)?;
                debug!(record_type = %name, "resolved jsonb_array child type");
                record_type
            }
        };
        *child = ChildType::Resolved(record_type.clone());
        Ok(record_type)
    }
}

impl ColumnType for JsonbArrayType {
    type Value = RecordCollection;

    fn type_tag(&self) -> &'static str {
        JSONB_ARRAY_TYPE_TAG
    }

    fn cast(&self, raw: RawValue) -> RecordResult<RecordCollection> {
        let record_type = self.child_type()?;
        RecordCollection::wrap_with(raw, &record_type, &self.options)
    }

    fn deserialize(&self, raw: RawValue) -> RecordResult<RecordCollection> {
        let from_storage = matches!(raw, RawValue::Text(_) | RawValue::Json(_));
        let mut collection = self.cast(decode_json(raw)?)?;
        if from_storage && self.options.clears_changes_on_load() {
            collection.clear_changes();
        }
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordError;
    use crate::record::{AttributeOptions, ChangeTracked};
    use serde_json::json;

    fn tag() -> RecordType {
        RecordType::builder("JsonbArrayTag")
            .attribute("label", AttributeOptions::typed("string"))
            .unwrap()
            .build()
    }

    #[test]
    fn test_type_tag() {
        assert_eq!(JsonbArrayType::new(&tag()).type_tag(), "jsonb_array");
    }

    #[test]
    fn test_named_child_resolved_once() {
        let record_type = RecordType::builder("JsonbArrayLazyTag").build();
        record_type.register().unwrap();

        let column = JsonbArrayType::named("JsonbArrayLazyTag");
        assert!(!column.is_resolved().unwrap());

        column.cast(RawValue::Null).unwrap();
        assert!(column.is_resolved().unwrap());
        assert!(column.child_type().unwrap().same_as(&record_type));
    }

    #[test]
    fn test_unknown_child_name() {
        let column = JsonbArrayType::named("JsonbArrayNoSuchType");
        assert!(matches!(
            column.cast(RawValue::Null),
            Err(RecordError::UnresolvedType(name)) if name == "JsonbArrayNoSuchType"
        ));
        assert!(!column.is_resolved().unwrap());
    }

    #[test]
    fn test_clear_changes_on_load() {
        let raw = RawValue::from(r#"[{"label":"a"}]"#);

        let column = JsonbArrayType::new(&tag());
        assert!(column.deserialize(raw.clone()).unwrap()[0].is_changed());

        let options = CastOptions::new().clear_changes_on_load(true);
        let column = JsonbArrayType::new(&tag()).with_options(options);
        let loaded = column.deserialize(raw).unwrap();
        assert!(!loaded[0].is_changed());
        assert_eq!(loaded[0].get("label").unwrap(), json!("a"));
    }
}
