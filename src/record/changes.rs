//! Per-attribute change tracking.

use crate::core::JsonValue;
use std::collections::HashMap;

/// One attribute's value before and after its pending change.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub attribute: String,
    pub old: JsonValue,
    pub new: JsonValue,
}

/// Remembers, for every changed attribute, the value it had before its first
/// change. An attribute stays changed until the changes are applied or
/// cleared, even if it is later set back to its original value.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    originals: HashMap<String, JsonValue>,
    previous: Vec<AttributeChange>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `attribute` is about to change away from `current`.
    /// Only the first call per attribute is kept.
    pub fn will_change(&mut self, attribute: &str, current: JsonValue) {
        if !self.originals.contains_key(attribute) {
            self.originals.insert(attribute.to_string(), current);
        }
    }

    pub fn is_changed(&self, attribute: &str) -> bool {
        self.originals.contains_key(attribute)
    }

    pub fn has_changes(&self) -> bool {
        !self.originals.is_empty()
    }

    pub fn original(&self, attribute: &str) -> Option<&JsonValue> {
        self.originals.get(attribute)
    }

    /// Moves the pending changes into the previous set.
    pub fn apply(&mut self, applied: Vec<AttributeChange>) {
        self.previous = applied;
        self.originals.clear();
    }

    pub fn previous(&self) -> &[AttributeChange] {
        &self.previous
    }

    pub fn clear(&mut self) {
        self.originals.clear();
        self.previous.clear();
    }

    pub(crate) fn take_originals(&mut self) -> HashMap<String, JsonValue> {
        std::mem::take(&mut self.originals)
    }
}
