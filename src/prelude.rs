//! Everything needed to declare record types and drive a column, including
//! the capability traits whose methods records expose.

pub use crate::{
    AttributeEnumerable, AttributeOptions, CastOptions, ChangeTracked, ColumnType, EmbeddedModel,
    EmbeddedRecord, JsonValue, JsonbArrayType, RawValue, RecordCollection, RecordError,
    RecordResult, RecordType, ValidationErrors, ValidationRule, embedded_record,
};
