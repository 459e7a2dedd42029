//! `embedded_record!`: declares a typed wrapper around [`EmbeddedRecord`]
//! with named accessors for every attribute.
//!
//! [`EmbeddedRecord`]: crate::EmbeddedRecord

/// Declares an embedded record type.
///
/// Each attribute is `name`, optionally followed by `: "type_tag"` and
/// `= default`. For every attribute the wrapper gets a getter `name()`, a
/// setter `set_name(value)` and a presence check `name_present()`. Attribute
/// names must not collide with the wrapper's own methods (`new`,
/// `from_attributes`, `record_type`).
///
/// ```
/// use associated_jsonb::embedded_record;
/// use serde_json::json;
///
/// embedded_record! {
///     pub struct DocAddress {
///         street: "string",
///         floor: "integer",
///         primary: "boolean" = false,
///     }
/// }
///
/// let mut address = DocAddress::from_attributes(json!({"street": "Main", "floor": "3"})).unwrap();
/// assert_eq!(address.floor(), json!(3));
/// assert_eq!(address.primary(), json!(false));
/// address.set_primary(true).unwrap();
/// assert!(address.street_present());
/// ```
#[macro_export]
macro_rules! embedded_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $field:ident $(: $type_tag:literal)? $(= $default:expr)? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name($crate::EmbeddedRecord);

        impl $name {
            /// Name the record type is registered under.
            pub const TYPE_NAME: &'static str = stringify!($name);

            /// The record type, built on first call and registered by name.
            pub fn record_type() -> $crate::RecordResult<$crate::RecordType> {
                static RECORD_TYPE: std::sync::OnceLock<$crate::RecordType> =
                    std::sync::OnceLock::new();

                match RECORD_TYPE.get() {
                    Some(record_type) => Ok(record_type.clone()),
                    None => {
                        let builder = $crate::RecordType::builder(Self::TYPE_NAME);
                        $(
                            let builder = builder.attribute(stringify!($field), {
                                let options = $crate::AttributeOptions::new();
                                $( let options = options.with_type($type_tag); )?
                                $( let options = options.with_default($default); )?
                                options
                            })?;
                        )*
                        let record_type = RECORD_TYPE.get_or_init(|| builder.build()).clone();
                        record_type.register()?;
                        Ok(record_type)
                    }
                }
            }

            pub fn new() -> $crate::RecordResult<Self> {
                Ok(Self($crate::EmbeddedRecord::new(&Self::record_type()?)))
            }

            pub fn from_attributes(attributes: $crate::JsonValue) -> $crate::RecordResult<Self> {
                let record_type = Self::record_type()?;
                Ok(Self($crate::EmbeddedRecord::from_attributes(&record_type, attributes)?))
            }

            $crate::paste::paste! {
                $(
                    pub fn $field(&self) -> $crate::JsonValue {
                        // Declared on this type, so the lookup cannot miss.
                        self.0
                            .get(stringify!($field))
                            .unwrap_or($crate::JsonValue::Null)
                    }

                    pub fn [<set_ $field>](
                        &mut self,
                        value: impl Into<$crate::JsonValue>,
                    ) -> $crate::RecordResult<()> {
                        self.0.set(stringify!($field), value)
                    }

                    pub fn [<$field _present>](&self) -> bool {
                        self.0.is_present(stringify!($field)).unwrap_or(false)
                    }
                )*
            }
        }

        impl $crate::EmbeddedModel for $name {
            fn record_type() -> $crate::RecordResult<$crate::RecordType> {
                $name::record_type()
            }

            fn from_record(record: $crate::EmbeddedRecord) -> $crate::RecordResult<Self> {
                let record_type = $name::record_type()?;
                if record.is_instance_of(&record_type) {
                    Ok(Self(record))
                } else {
                    Err($crate::RecordError::InvalidElement(format!(
                        "a '{}' record is not a '{}'",
                        record.type_name(),
                        Self::TYPE_NAME
                    )))
                }
            }

            fn record(&self) -> &$crate::EmbeddedRecord {
                &self.0
            }

            fn record_mut(&mut self) -> &mut $crate::EmbeddedRecord {
                &mut self.0
            }

            fn into_record(self) -> $crate::EmbeddedRecord {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::EmbeddedRecord;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$name> for $crate::EmbeddedRecord {
            fn from(model: $name) -> Self {
                model.0
            }
        }

        impl From<$name> for $crate::RecordInput {
            fn from(model: $name) -> Self {
                $crate::RecordInput::Record(model.0)
            }
        }

        impl TryFrom<$crate::EmbeddedRecord> for $name {
            type Error = $crate::RecordError;

            fn try_from(record: $crate::EmbeddedRecord) -> Result<Self, Self::Error> {
                <$name as $crate::EmbeddedModel>::from_record(record)
            }
        }
    };
}
