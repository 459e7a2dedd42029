pub mod error;
pub mod types;
pub mod value;

pub use error::{RecordError, RecordResult};
pub use types::{
    AttributeType, AttributeTypeRegistry, lookup_attribute_type, register_attribute_type,
};
pub use value::{JsonMap, JsonValue, is_present};
