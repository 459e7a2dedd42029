// ============================================================================
// associated_jsonb
// ============================================================================

//! Typed, change-tracked embedded records stored in one JSON array column.
//!
//! - [`RecordType`] declares the attributes of an embedded record (defaults,
//!   type tags, validation rules); [`embedded_record!`] does the same with a
//!   typed wrapper.
//! - [`EmbeddedRecord`] holds one element's values and its dirty state.
//! - [`RecordCollection`] is the ordered, homogeneous list a column holds.
//! - [`JsonbArrayType`] is the column type the persistence host calls to
//!   load, store and diff the column.
//!
//! # Examples
//!
//! ```
//! use associated_jsonb::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let product = RecordType::builder("DocProduct")
//!     .attribute("name", AttributeOptions::typed("string"))?
//!     .attribute("price", AttributeOptions::typed("float"))?
//!     .attribute("active", AttributeOptions::typed("boolean").with_default(false))?
//!     .build();
//!
//! let column = JsonbArrayType::new(&product);
//! let mut products = column.deserialize(RawValue::from(r#"[{"name":"Widget","price":"3.5"}]"#))?;
//! assert_eq!(
//!     products[0].attributes_snapshot(),
//!     json!({"name": "Widget", "price": 3.5, "active": false}).as_object().cloned().unwrap()
//! );
//!
//! let stored = RawValue::from(column.serialize(&products)?.unwrap());
//! products[0].set("price", 4.0)?;
//! assert!(column.changed_in_place(&stored, &products)?);
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod column;
pub mod config;
pub mod core;
mod macros;
pub mod prelude;
pub mod record;

pub use collection::{RawValue, RecordCollection, RecordInput};
pub use column::{
    ChildType, ColumnType, JSONB_ARRAY_TYPE_TAG, JsonColumn, JsonbArrayType, ToColumnJson,
};
pub use config::CastOptions;
pub use crate::core::{
    AttributeType, JsonMap, JsonValue, RecordError, RecordResult, lookup_attribute_type,
    register_attribute_type,
};
pub use record::{
    AttributeChange, AttributeEnumerable, AttributeOptions, ChangeTracked, EmbeddedModel,
    EmbeddedRecord, FieldError, RecordType, RecordTypeRegistry, ValidationErrors, ValidationRule,
};

#[doc(hidden)]
pub use paste;
