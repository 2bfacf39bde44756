//! Attribute access on the record that owns a field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named attribute access on an owning record.
///
/// A markup field reads and writes three attributes through this trait: the
/// raw text (named after the field), the optional selectable markup type, and
/// the optional persisted rendered output. How attributes are stored is up to
/// the implementor.
pub trait Record {
    /// Current value of attribute `name`, or `None` when unset or null.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Set attribute `name`. `None` stores a null.
    fn set_attr(&mut self, name: &str, value: Option<String>);
}

impl<T: Record + ?Sized> Record for &mut T {
    fn attr(&self, name: &str) -> Option<&str> {
        (**self).attr(name)
    }

    fn set_attr(&mut self, name: &str, value: Option<String>) {
        (**self).set_attr(name, value);
    }
}

/// In-memory record backed by an ordered map.
///
/// Serializes as a flat JSON object, matching the stored layout of a field:
///
/// ```
/// use markup_field::{MemoryRecord, Record};
///
/// let mut record = MemoryRecord::new().with("body", "hello");
/// record.set_attr("_body_rendered", None);
/// assert_eq!(record.attr("body"), Some("hello"));
/// assert_eq!(record.attr("_body_rendered"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryRecord {
    attrs: BTreeMap<String, Option<String>>,
}

impl MemoryRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set attribute `name` to `value`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), Some(value.into()));
        self
    }

    /// Whether attribute `name` has been set, possibly to null.
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Attribute names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.attrs.keys().map(String::as_str)
    }
}

impl Record for MemoryRecord {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Option::as_deref)
    }

    fn set_attr(&mut self, name: &str, value: Option<String>) {
        self.attrs.insert(name.to_owned(), value);
    }
}
