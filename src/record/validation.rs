//! Validation extension point.
//!
//! Record types carry an ordered chain of [`ValidationRule`]s. Running the
//! chain never short-circuits: every rule sees the record and appends its
//! findings to a shared [`ValidationErrors`]. Concrete rules (presence,
//! format, ...) live with the application.

use super::EmbeddedRecord;
use std::fmt;
use std::sync::Arc;

/// A rule evaluated against one record.
pub trait ValidationRule: Send + Sync {
    fn validate(&self, record: &EmbeddedRecord, errors: &mut ValidationErrors);
}

impl<F> ValidationRule for F
where
    F: Fn(&EmbeddedRecord, &mut ValidationErrors) + Send + Sync,
{
    fn validate(&self, record: &EmbeddedRecord, errors: &mut ValidationErrors) {
        self(record, errors)
    }
}

/// One failed check on one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub attribute: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.message)
    }
}

/// Errors collected by a validation run, in the order rules reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            attribute: attribute.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Messages reported for one attribute.
    pub fn on(&self, attribute: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|err| err.attribute == attribute)
            .map(|err| err.message.as_str())
            .collect()
    }

    /// `"<attribute> <message>"` for every error.
    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

/// Ordered chain of rules.
#[derive(Clone, Default)]
pub struct RecordValidator {
    rules: Vec<Arc<dyn ValidationRule>>,
}

impl RecordValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: Arc<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn validate(&self, record: &EmbeddedRecord) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for rule in &self.rules {
            rule.validate(record, &mut errors);
        }
        errors
    }
}

impl fmt::Debug for RecordValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordValidator")
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AttributeOptions, RecordType};
    use serde_json::json;

    fn require(attribute: &'static str) -> impl ValidationRule {
        move |record: &EmbeddedRecord, errors: &mut ValidationErrors| {
            if !record.is_present(attribute).unwrap_or(false) {
                errors.add(attribute, "can't be blank");
            }
        }
    }

    #[test]
    fn test_every_rule_runs() {
        let record_type = RecordType::builder("Contact")
            .attribute("name", AttributeOptions::new())
            .unwrap()
            .attribute("email", AttributeOptions::typed("string"))
            .unwrap()
            .build();

        let mut validator = RecordValidator::new();
        validator.add_rule(Arc::new(require("name")));
        validator.add_rule(Arc::new(require("email")));

        let record = EmbeddedRecord::new(&record_type);
        let errors = validator.validate(&record);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.full_messages(),
            vec!["name can't be blank", "email can't be blank"]
        );

        let record =
            EmbeddedRecord::from_attributes(&record_type, json!({"name": "Ada", "email": "a@b"}))
                .unwrap();
        assert!(validator.validate(&record).is_empty());
    }

    #[test]
    fn test_errors_on_attribute() {
        let mut errors = ValidationErrors::new();
        errors.add("price", "must be positive");
        errors.add("name", "is too short");
        errors.add("price", "must be a number");

        assert_eq!(errors.on("price"), vec!["must be positive", "must be a number"]);
        assert!(errors.on("active").is_empty());
    }
}
