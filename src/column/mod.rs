//! Column types.
//!
//! The persistence host talks to a column through [`ColumnType`]: `cast` for
//! values assigned in memory, `deserialize` for values read from storage,
//! `serialize` for values written back, and `changed_in_place` to decide
//! whether a column needs rewriting.
//!
//! - `json.rs` - the plain JSON column and the JSON text step shared by
//!   every JSON-backed type
//! - `jsonb_array.rs` - JSON arrays of embedded records

mod json;
mod jsonb_array;

pub use json::{JsonColumn, ToColumnJson, decode_json, encode_json};
pub use jsonb_array::{ChildType, JSONB_ARRAY_TYPE_TAG, JsonbArrayType};

use crate::collection::RawValue;
use crate::core::RecordResult;

/// Contract a column-type plugin fulfils for the persistence host.
pub trait ColumnType {
    /// In-memory value produced by `cast` and `deserialize`.
    type Value: ToColumnJson;

    /// Tag reported to the host's type registry.
    fn type_tag(&self) -> &'static str;

    /// Converts a value assigned by application code.
    fn cast(&self, raw: RawValue) -> RecordResult<Self::Value>;

    /// Converts a value read from storage.
    fn deserialize(&self, raw: RawValue) -> RecordResult<Self::Value>;

    /// JSON text to store, or `None` for SQL NULL.
    fn serialize(&self, value: &dyn ToColumnJson) -> RecordResult<Option<String>> {
        encode_json(value)
    }

    /// `true` when `new_value` no longer serializes like the stored value.
    fn changed_in_place(
        &self,
        raw_old: &RawValue,
        new_value: &dyn ToColumnJson,
    ) -> RecordResult<bool> {
        let old = self.deserialize(raw_old.clone())?;
        Ok(self.serialize(&old)? != self.serialize(new_value)?)
    }
}
