//! Record schemas.
//!
//! A [`RecordType`] is a cheap, clonable handle to an immutable
//! [`RecordSchema`]: the ordered attribute descriptors plus the validation
//! rules of one embedded record type. Schemas are assembled once through
//! [`RecordTypeBuilder`] and never change afterwards.

use super::validation::{RecordValidator, ValidationRule};
use crate::core::{AttributeType, JsonValue, RecordError, RecordResult, lookup_attribute_type};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Options accepted when declaring an attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeOptions {
    pub default: Option<JsonValue>,
    pub type_tag: Option<String>,
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for an attribute with a type tag and no default.
    pub fn typed(type_tag: impl Into<String>) -> Self {
        Self::new().with_type(type_tag)
    }

    pub fn with_type(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<JsonValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// One declared attribute with its type tag already resolved.
#[derive(Clone)]
pub struct AttributeDescriptor {
    name: String,
    default: JsonValue,
    type_tag: Option<String>,
    coercion: Option<Arc<dyn AttributeType>>,
}

impl AttributeDescriptor {
    fn new(name: String, options: AttributeOptions) -> RecordResult<Self> {
        let coercion = options
            .type_tag
            .as_deref()
            .map(lookup_attribute_type)
            .transpose()?;

        Ok(Self {
            name,
            default: options.default.unwrap_or(JsonValue::Null),
            type_tag: options.type_tag,
            coercion,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &JsonValue {
        &self.default
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    /// Getter view of a stored value: the default stands in for null, then
    /// the type coerces.
    pub fn read(&self, stored: Option<&JsonValue>) -> JsonValue {
        let value = match stored {
            Some(value) if !value.is_null() => value,
            _ => &self.default,
        };
        self.cast(value)
    }

    /// Coerces without substituting the default.
    pub fn cast(&self, value: &JsonValue) -> JsonValue {
        match &self.coercion {
            Some(coercion) => coercion.cast(value),
            None => value.clone(),
        }
    }

    /// Normalizes a value before it is stored.
    pub fn normalize(&self, value: JsonValue) -> JsonValue {
        match &self.coercion {
            Some(coercion) => coercion.deserialize(&value),
            None => value,
        }
    }
}

impl fmt::Debug for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("type_tag", &self.type_tag)
            .finish()
    }
}

/// The attribute list and validation rules of one record type.
pub struct RecordSchema {
    name: String,
    attributes: Vec<AttributeDescriptor>,
    positions: HashMap<String, usize>,
    validator: RecordValidator,
}

impl RecordSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptors in declaration order.
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.positions.get(name).map(|&idx| &self.attributes[idx])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|attr| attr.name())
    }

    pub fn validator(&self) -> &RecordValidator {
        &self.validator
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("validator", &self.validator)
            .finish()
    }
}

/// Handle to a record schema. Clones share the schema.
#[derive(Debug, Clone)]
pub struct RecordType {
    schema: Arc<RecordSchema>,
}

impl RecordType {
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// `true` when both handles point at the same schema.
    pub fn same_as(&self, other: &RecordType) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema)
    }

    /// Adds this type to the global registry so adapters can find it by name.
    pub fn register(&self) -> RecordResult<()> {
        RecordTypeRegistry::global().register(self.clone())
    }
}

/// Builder for a [`RecordType`]. Declaration order is kept.
pub struct RecordTypeBuilder {
    name: String,
    attributes: Vec<AttributeDescriptor>,
    positions: HashMap<String, usize>,
    validator: RecordValidator,
}

impl RecordTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            positions: HashMap::new(),
            validator: RecordValidator::new(),
        }
    }

    /// Declares an attribute.
    ///
    /// Fails with `UnknownType` when the type tag is not registered and with
    /// `DuplicateAttribute` when the name is already declared.
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        options: AttributeOptions,
    ) -> RecordResult<Self> {
        let name = name.into();
        if self.positions.contains_key(&name) {
            return Err(RecordError::DuplicateAttribute {
                attribute: name,
                record_type: self.name,
            });
        }

        let descriptor = AttributeDescriptor::new(name.clone(), options)?;
        self.positions.insert(name, self.attributes.len());
        self.attributes.push(descriptor);
        Ok(self)
    }

    /// Attaches a validation rule.
    pub fn validates<R>(mut self, rule: R) -> Self
    where
        R: ValidationRule + 'static,
    {
        self.validator.add_rule(Arc::new(rule));
        self
    }

    pub fn build(self) -> RecordType {
        RecordType {
            schema: Arc::new(RecordSchema {
                name: self.name,
                attributes: self.attributes,
                positions: self.positions,
                validator: self.validator,
            }),
        }
    }
}

/// Name → record type lookup used to resolve adapters configured by name.
#[derive(Debug, Default)]
pub struct RecordTypeRegistry {
    types: RwLock<HashMap<String, RecordType>>,
}

lazy_static! {
    static ref GLOBAL_RECORD_TYPES: RecordTypeRegistry = RecordTypeRegistry::new();
}

impl RecordTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static RecordTypeRegistry {
        &GLOBAL_RECORD_TYPES
    }

    /// Registers a type under its name. Registering the same handle again is
    /// a no-op; a different schema under a taken name is rejected.
    pub fn register(&self, record_type: RecordType) -> RecordResult<()> {
        let mut types = self.types.write()?;
        if let Some(existing) = types.get(record_type.name()) {
            if existing.same_as(&record_type) {
                return Ok(());
            }
            return Err(RecordError::DuplicateRecordType(
                record_type.name().to_string(),
            ));
        }

        debug!(record_type = record_type.name(), "registered record type");
        types.insert(record_type.name().to_string(), record_type);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> RecordResult<RecordType> {
        self.types
            .read()?
            .get(name)
            .cloned()
            .ok_or_else(|| RecordError::UnresolvedType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> RecordResult<bool> {
        Ok(self.types.read()?.contains_key(name))
    }
}
