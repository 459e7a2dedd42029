//! Homogeneous collections of embedded records.

use crate::config::CastOptions;
use crate::core::{JsonValue, RecordError, RecordResult};
use crate::record::{AttributeEnumerable, ChangeTracked, EmbeddedModel, EmbeddedRecord, RecordType};
use serde::{Serialize, Serializer};
use std::ops::{Index, IndexMut};
use tracing::trace;

/// One element handed to [`RecordCollection::wrap`].
#[derive(Debug, Clone)]
pub enum RecordInput {
    /// An existing record, kept as-is when its type matches.
    Record(EmbeddedRecord),
    /// Plain attributes; must be a JSON object.
    Attributes(JsonValue),
}

impl From<EmbeddedRecord> for RecordInput {
    fn from(record: EmbeddedRecord) -> Self {
        RecordInput::Record(record)
    }
}

impl From<JsonValue> for RecordInput {
    fn from(value: JsonValue) -> Self {
        RecordInput::Attributes(value)
    }
}

/// A raw column value: what storage hands over, or what application code
/// assigns to the column.
#[derive(Debug, Clone, Default)]
pub enum RawValue {
    #[default]
    Null,
    /// JSON text as stored.
    Text(String),
    /// Already parsed JSON.
    Json(JsonValue),
    Records(Vec<RecordInput>),
    Collection(RecordCollection),
}

impl From<JsonValue> for RawValue {
    fn from(value: JsonValue) -> Self {
        RawValue::Json(value)
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

impl From<EmbeddedRecord> for RawValue {
    fn from(record: EmbeddedRecord) -> Self {
        RawValue::Records(vec![RecordInput::Record(record)])
    }
}

impl From<Vec<EmbeddedRecord>> for RawValue {
    fn from(records: Vec<EmbeddedRecord>) -> Self {
        RawValue::Records(records.into_iter().map(RecordInput::Record).collect())
    }
}

impl From<Vec<RecordInput>> for RawValue {
    fn from(items: Vec<RecordInput>) -> Self {
        RawValue::Records(items)
    }
}

impl From<RecordCollection> for RawValue {
    fn from(collection: RecordCollection) -> Self {
        RawValue::Collection(collection)
    }
}

impl<T> From<Option<T>> for RawValue
where
    T: Into<RawValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl RawValue {
    /// Raw value holding typed records, as assigned by application code.
    pub fn from_models<T, I>(models: I) -> Self
    where
        T: EmbeddedModel,
        I: IntoIterator<Item = T>,
    {
        RawValue::Records(
            models
                .into_iter()
                .map(|model| RecordInput::Record(model.into_record()))
                .collect(),
        )
    }
}

/// Ordered records of one record type.
#[derive(Debug, Clone)]
pub struct RecordCollection {
    record_type: RecordType,
    records: Vec<EmbeddedRecord>,
}

impl RecordCollection {
    pub fn new(record_type: &RecordType) -> Self {
        Self {
            record_type: record_type.clone(),
            records: Vec::new(),
        }
    }

    /// Wraps a raw value into records of `record_type`.
    ///
    /// Null is empty and a lone object is a one-element sequence. Records
    /// already of `record_type` are kept as they are; everything else must
    /// be a JSON object and becomes a new record. The first invalid element
    /// fails the whole call.
    pub fn wrap(input: impl Into<RawValue>, record_type: &RecordType) -> RecordResult<Self> {
        Self::wrap_with(input, record_type, &CastOptions::default())
    }

    pub fn wrap_with(
        input: impl Into<RawValue>,
        record_type: &RecordType,
        options: &CastOptions,
    ) -> RecordResult<Self> {
        let items: Vec<RecordInput> = match input.into() {
            RawValue::Null | RawValue::Json(JsonValue::Null) => Vec::new(),
            RawValue::Json(JsonValue::Array(items)) => {
                items.into_iter().map(RecordInput::Attributes).collect()
            }
            RawValue::Json(other) => vec![RecordInput::Attributes(other)],
            RawValue::Text(text) => vec![RecordInput::Attributes(JsonValue::String(text))],
            RawValue::Records(items) => items,
            RawValue::Collection(collection) => collection
                .records
                .into_iter()
                .map(RecordInput::Record)
                .collect(),
        };

        let records = items
            .into_iter()
            .map(|item| wrap_item(item, record_type, options))
            .collect::<RecordResult<Vec<_>>>()?;

        trace!(
            record_type = record_type.name(),
            count = records.len(),
            "wrapped records"
        );

        Ok(Self {
            record_type: record_type.clone(),
            records,
        })
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EmbeddedRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut EmbeddedRecord> {
        self.records.get_mut(index)
    }

    pub fn first(&self) -> Option<&EmbeddedRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&EmbeddedRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EmbeddedRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, EmbeddedRecord> {
        self.records.iter_mut()
    }

    /// Appends a record of this collection's type.
    pub fn push(&mut self, record: EmbeddedRecord) -> RecordResult<()> {
        let record = wrap_item(
            RecordInput::Record(record),
            &self.record_type,
            &CastOptions::default(),
        )?;
        self.records.push(record);
        Ok(())
    }

    /// Builds a record from a JSON object and appends it.
    pub fn push_attributes(&mut self, attributes: JsonValue) -> RecordResult<&mut EmbeddedRecord> {
        let record = EmbeddedRecord::from_attributes(&self.record_type, attributes)?;
        self.records.push(record);
        let last = self.records.len() - 1;
        Ok(&mut self.records[last])
    }

    /// Removes and returns the record at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<EmbeddedRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// Keeps only the records matching `predicate`, preserving order.
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&EmbeddedRecord) -> bool,
    {
        self.records.retain(predicate);
    }

    /// Membership by value.
    pub fn contains(&self, record: &EmbeddedRecord) -> bool {
        self.records.contains(record)
    }

    /// `true` when any record has pending changes.
    pub fn is_changed(&self) -> bool {
        self.records.iter().any(|record| record.is_changed())
    }

    /// Drops the change state of every record.
    pub fn clear_changes(&mut self) {
        for record in &mut self.records {
            record.clear_changes();
        }
    }

    /// JSON array of each record's attribute snapshot.
    pub fn to_serializable(&self) -> JsonValue {
        JsonValue::Array(
            self.records
                .iter()
                .map(|record| JsonValue::Object(record.attributes_snapshot()))
                .collect(),
        )
    }

    pub fn to_json(&self) -> RecordResult<String> {
        Ok(serde_json::to_string(&self.to_serializable())?)
    }

    /// The underlying records.
    pub fn to_list(&self) -> &[EmbeddedRecord] {
        &self.records
    }

    pub fn as_slice(&self) -> &[EmbeddedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EmbeddedRecord> {
        self.records
    }

    /// Appends a typed record.
    pub fn push_model<T: EmbeddedModel>(&mut self, model: T) -> RecordResult<()> {
        self.push(model.into_record())
    }

    /// Converts every record into its typed wrapper.
    pub fn into_models<T: EmbeddedModel>(self) -> RecordResult<Vec<T>> {
        self.records.into_iter().map(T::from_record).collect()
    }
}

fn wrap_item(
    item: RecordInput,
    record_type: &RecordType,
    options: &CastOptions,
) -> RecordResult<EmbeddedRecord> {
    match item {
        RecordInput::Record(record) if record.is_instance_of(record_type) => Ok(record),
        RecordInput::Record(record) => Err(RecordError::InvalidElement(format!(
            "a '{}' record cannot join a collection of '{}'",
            record.type_name(),
            record_type.name()
        ))),
        RecordInput::Attributes(attributes) => {
            EmbeddedRecord::build(record_type, attributes, options.is_strict())
        }
    }
}

impl PartialEq for RecordCollection {
    fn eq(&self, other: &Self) -> bool {
        self.record_type.same_as(&other.record_type) && self.records == other.records
    }
}

impl Index<usize> for RecordCollection {
    type Output = EmbeddedRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl IndexMut<usize> for RecordCollection {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.records[index]
    }
}

impl IntoIterator for RecordCollection {
    type Item = EmbeddedRecord;
    type IntoIter = std::vec::IntoIter<EmbeddedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a EmbeddedRecord;
    type IntoIter = std::slice::Iter<'a, EmbeddedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a mut RecordCollection {
    type Item = &'a mut EmbeddedRecord;
    type IntoIter = std::slice::IterMut<'a, EmbeddedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter_mut()
    }
}

impl Serialize for RecordCollection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.records.iter())
    }
}
