//! Options controlling how raw column values become records.

/// Options applied while casting raw values into a [`RecordCollection`].
///
/// [`RecordCollection`]: crate::RecordCollection
///
/// # Examples
///
/// ```
/// use associated_jsonb::CastOptions;
///
/// let options = CastOptions::new()
///     .clear_changes_on_load(true)
///     .strict_attributes(true);
/// assert!(options.clears_changes_on_load());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastOptions {
    clear_changes_on_load: bool,
    strict_attributes: bool,
}

impl CastOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records built while loading from storage start without pending
    /// changes. Off by default: assigning loaded attributes marks them
    /// changed just like any other assignment.
    pub fn clear_changes_on_load(mut self, enabled: bool) -> Self {
        self.clear_changes_on_load = enabled;
        self
    }

    /// Keys that name no declared attribute fail with `UnknownAttribute`
    /// instead of being skipped.
    pub fn strict_attributes(mut self, enabled: bool) -> Self {
        self.strict_attributes = enabled;
        self
    }

    pub fn clears_changes_on_load(&self) -> bool {
        self.clear_changes_on_load
    }

    pub fn is_strict(&self) -> bool {
        self.strict_attributes
    }
}
