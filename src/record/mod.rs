//! Embedded records.
//!
//! An [`EmbeddedRecord`] is one element of a JSON array column: a set of
//! declared attributes with defaults and type coercion, per-attribute change
//! tracking and an ordered snapshot for serialization. It has no identity of
//! its own and lives exactly as long as the collection that owns it.

mod changes;
mod schema;
mod validation;

pub use changes::{AttributeChange, ChangeTracker};
pub use schema::{
    AttributeDescriptor, AttributeOptions, RecordSchema, RecordType, RecordTypeBuilder,
    RecordTypeRegistry,
};
pub use validation::{FieldError, RecordValidator, ValidationErrors, ValidationRule};

use crate::core::{JsonMap, JsonValue, RecordError, RecordResult, is_present, value::type_name};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Ordered name → value view of a record.
pub trait AttributeEnumerable {
    /// Declared attribute names in declaration order.
    fn attribute_names(&self) -> Vec<&str>;

    /// Every declared attribute mapped to its getter value, in declaration
    /// order.
    fn attributes_snapshot(&self) -> JsonMap;
}

/// Per-attribute dirty state.
pub trait ChangeTracked {
    /// Marks `attribute` as about to change, remembering its current value.
    fn attribute_will_change(&mut self, attribute: &str) -> RecordResult<()>;

    fn attribute_changed(&self, attribute: &str) -> bool;

    /// `true` when any attribute has a pending change.
    fn is_changed(&self) -> bool;

    /// Changed attribute names in declaration order.
    fn changed_attributes(&self) -> Vec<String>;

    /// Pending changes in declaration order.
    fn changes(&self) -> Vec<AttributeChange>;

    /// Value before the pending change, or the current value when unchanged.
    fn attribute_was(&self, attribute: &str) -> RecordResult<JsonValue>;

    /// Accepts the pending changes; they become [`previous_changes`].
    ///
    /// [`previous_changes`]: ChangeTracked::previous_changes
    fn changes_applied(&mut self);

    fn previous_changes(&self) -> &[AttributeChange];

    /// Forgets pending and previous changes without touching values.
    fn clear_changes(&mut self);

    /// Puts every changed attribute back to its value before the change.
    fn restore_attributes(&mut self);
}

/// A named record type with a typed wrapper, as declared by
/// [`embedded_record!`](crate::embedded_record).
pub trait EmbeddedModel: Sized {
    /// The type's schema, built and registered on first call.
    fn record_type() -> RecordResult<RecordType>;

    /// Wraps a record, which must be of [`record_type`](Self::record_type).
    fn from_record(record: EmbeddedRecord) -> RecordResult<Self>;

    fn record(&self) -> &EmbeddedRecord;

    fn record_mut(&mut self) -> &mut EmbeddedRecord;

    fn into_record(self) -> EmbeddedRecord;
}

#[derive(Clone)]
pub struct EmbeddedRecord {
    record_type: RecordType,
    values: HashMap<String, JsonValue>,
    changes: ChangeTracker,
}

impl EmbeddedRecord {
    /// A record with every attribute unset.
    pub fn new(record_type: &RecordType) -> Self {
        Self {
            record_type: record_type.clone(),
            values: HashMap::new(),
            changes: ChangeTracker::new(),
        }
    }

    /// Builds a record from a JSON object, assigning each declared key through
    /// the setter. Undeclared keys are ignored.
    pub fn from_attributes(record_type: &RecordType, attributes: JsonValue) -> RecordResult<Self> {
        Self::build(record_type, attributes, false)
    }

    pub(crate) fn build(
        record_type: &RecordType,
        attributes: JsonValue,
        strict: bool,
    ) -> RecordResult<Self> {
        let mut record = Self::new(record_type);
        record.assign(attributes, strict)?;
        Ok(record)
    }

    /// Assigns every declared key of a JSON object. Undeclared keys are ignored.
    pub fn assign_attributes(&mut self, attributes: JsonValue) -> RecordResult<()> {
        self.assign(attributes, false)
    }

    fn assign(&mut self, attributes: JsonValue, strict: bool) -> RecordResult<()> {
        let JsonValue::Object(map) = attributes else {
            return Err(RecordError::InvalidElement(format!(
                "expected an object of attributes for '{}', got {}",
                self.type_name(),
                type_name(&attributes)
            )));
        };

        let record_type = self.record_type.clone();
        for (name, value) in map {
            match record_type.schema().attribute(&name) {
                Some(attr) => self.write(attr, value),
                None if strict => {
                    return Err(RecordError::unknown_attribute(&name, record_type.name()));
                }
                None => trace!(
                    record_type = record_type.name(),
                    attribute = %name,
                    "ignoring undeclared attribute"
                ),
            }
        }
        Ok(())
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    pub fn type_name(&self) -> &str {
        self.record_type.name()
    }

    /// `true` when this record was built from `record_type`'s schema.
    pub fn is_instance_of(&self, record_type: &RecordType) -> bool {
        self.record_type.same_as(record_type)
    }

    fn descriptor(&self, name: &str) -> RecordResult<&AttributeDescriptor> {
        self.record_type
            .schema()
            .attribute(name)
            .ok_or_else(|| RecordError::unknown_attribute(name, self.type_name()))
    }

    /// Stored value, or the default when unset, coerced by the attribute type.
    pub fn get(&self, name: &str) -> RecordResult<JsonValue> {
        let attr = self.descriptor(name)?;
        Ok(attr.read(self.values.get(name)))
    }

    /// Stores a normalized value, marking the attribute changed when the
    /// coerced value differs from the current one.
    pub fn set(&mut self, name: &str, value: impl Into<JsonValue>) -> RecordResult<()> {
        let record_type = self.record_type.clone();
        let attr = record_type
            .schema()
            .attribute(name)
            .ok_or_else(|| RecordError::unknown_attribute(name, record_type.name()))?;
        self.write(attr, value.into());
        Ok(())
    }

    fn write(&mut self, attr: &AttributeDescriptor, value: JsonValue) {
        let current = attr.read(self.values.get(attr.name()));
        if attr.cast(&value) != current {
            self.changes.will_change(attr.name(), current);
        }

        let normalized = attr.normalize(value);
        self.values.insert(attr.name().to_string(), normalized);
    }

    /// `true` when the getter value is non-null and not an empty string,
    /// array or object.
    pub fn is_present(&self, name: &str) -> RecordResult<bool> {
        self.get(name).map(|value| is_present(&value))
    }

    /// Runs the record type's validation rules.
    pub fn validate(&self) -> ValidationErrors {
        self.record_type.schema().validator().validate(self)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// The snapshot as JSON text.
    pub fn to_json(&self) -> RecordResult<String> {
        Ok(serde_json::to_string(&self.attributes_snapshot())?)
    }
}

impl AttributeEnumerable for EmbeddedRecord {
    fn attribute_names(&self) -> Vec<&str> {
        self.record_type.schema().attribute_names().collect()
    }

    fn attributes_snapshot(&self) -> JsonMap {
        self.record_type
            .schema()
            .attributes()
            .iter()
            .map(|attr| (attr.name().to_string(), attr.read(self.values.get(attr.name()))))
            .collect()
    }
}

impl ChangeTracked for EmbeddedRecord {
    fn attribute_will_change(&mut self, attribute: &str) -> RecordResult<()> {
        let current = self.get(attribute)?;
        self.changes.will_change(attribute, current);
        Ok(())
    }

    fn attribute_changed(&self, attribute: &str) -> bool {
        self.changes.is_changed(attribute)
    }

    fn is_changed(&self) -> bool {
        self.changes.has_changes()
    }

    fn changed_attributes(&self) -> Vec<String> {
        self.record_type
            .schema()
            .attribute_names()
            .filter(|name| self.changes.is_changed(name))
            .map(str::to_string)
            .collect()
    }

    fn changes(&self) -> Vec<AttributeChange> {
        self.record_type
            .schema()
            .attributes()
            .iter()
            .filter_map(|attr| {
                let old = self.changes.original(attr.name())?;
                Some(AttributeChange {
                    attribute: attr.name().to_string(),
                    old: old.clone(),
                    new: attr.read(self.values.get(attr.name())),
                })
            })
            .collect()
    }

    fn attribute_was(&self, attribute: &str) -> RecordResult<JsonValue> {
        match self.changes.original(attribute) {
            Some(original) => Ok(original.clone()),
            None => self.get(attribute),
        }
    }

    fn changes_applied(&mut self) {
        let applied = self.changes();
        self.changes.apply(applied);
    }

    fn previous_changes(&self) -> &[AttributeChange] {
        self.changes.previous()
    }

    fn clear_changes(&mut self) {
        self.changes.clear();
    }

    fn restore_attributes(&mut self) {
        for (name, original) in self.changes.take_originals() {
            self.values.insert(name, original);
        }
    }
}

impl PartialEq for EmbeddedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.record_type.same_as(&other.record_type)
            && self.attributes_snapshot() == other.attributes_snapshot()
    }
}

impl fmt::Debug for EmbeddedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedRecord")
            .field("type", &self.type_name())
            .field("attributes", &self.attributes_snapshot())
            .field("changed", &self.changed_attributes())
            .finish()
    }
}

impl Serialize for EmbeddedRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.attributes_snapshot().serialize(serializer)
    }
}
