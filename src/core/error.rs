use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Unknown attribute type '{0}'")]
    UnknownType(String),

    #[error("Invalid element: {0}")]
    InvalidElement(String),

    #[error("Unresolved record type '{0}'")]
    UnresolvedType(String),

    #[error("Unknown attribute '{attribute}' for record type '{record_type}'")]
    UnknownAttribute {
        attribute: String,
        record_type: String,
    },

    #[error("Attribute '{attribute}' already declared on record type '{record_type}'")]
    DuplicateAttribute {
        attribute: String,
        record_type: String,
    },

    #[error("Record type '{0}' is already registered with a different schema")]
    DuplicateRecordType(String),

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        RecordError::Parse(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for RecordError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

impl RecordError {
    pub(crate) fn unknown_attribute(attribute: &str, record_type: &str) -> Self {
        Self::UnknownAttribute {
            attribute: attribute.to_string(),
            record_type: record_type.to_string(),
        }
    }
}
