//! Field lifecycle hooks for the persistence and form layers.

use crate::config::{FieldConfig, RenderedStorage};
use crate::error::MarkupError;
use crate::record::Record;
use crate::value::{Markup, MarkupValue};

/// Label of the empty choice offered when a field has no default type.
pub const BLANK_CHOICE_LABEL: &str = "--";

/// Value assigned to a field slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Assignment {
    /// Raw text only; the stored markup type is kept.
    Raw(Option<String>),
    /// A whole markup value; raw text and markup type are copied together.
    Markup(Markup),
}

impl From<&str> for Assignment {
    fn from(raw: &str) -> Self {
        Self::Raw(Some(raw.to_owned()))
    }
}

impl From<String> for Assignment {
    fn from(raw: String) -> Self {
        Self::Raw(Some(raw))
    }
}

impl From<Option<String>> for Assignment {
    fn from(raw: Option<String>) -> Self {
        Self::Raw(raw)
    }
}

impl From<Markup> for Assignment {
    fn from(markup: Markup) -> Self {
        Self::Markup(markup)
    }
}

/// Anything that can be shown in an editable text control.
///
/// Normalizes raw strings and whole markup values to the raw text.
pub trait AsRawText {
    fn as_raw_text(&self) -> Option<&str>;
}

impl AsRawText for str {
    fn as_raw_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl AsRawText for String {
    fn as_raw_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl AsRawText for Markup {
    fn as_raw_text(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl<R: Record + ?Sized> AsRawText for MarkupValue<'_, R> {
    fn as_raw_text(&self) -> Option<&str> {
        self.raw()
    }
}

impl<T: AsRawText + ?Sized> AsRawText for Option<&T> {
    fn as_raw_text(&self) -> Option<&str> {
        self.and_then(AsRawText::as_raw_text)
    }
}

/// A markup field declared on a record type.
///
/// Holds the static [`FieldConfig`] and implements the hooks the persistence
/// layer calls: [`bind`](Self::bind) on access, [`load`](Self::load) after
/// hydration, [`assign`](Self::assign) on whole-value writes and
/// [`pre_save`](Self::pre_save) before storage.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use markup_field::{FieldConfig, MarkupField, MemoryRecord, Record};
/// use markup_registry::RendererRegistry;
///
/// let registry = Arc::new(RendererRegistry::with_defaults());
/// let field = MarkupField::new(
///     FieldConfig::builder("body", registry)
///         .with_default_markup_type("plain")
///         .build()?,
/// );
///
/// let mut record = MemoryRecord::new();
/// field.bind(&mut record)?.set_raw(Some("hello".to_owned()))?;
/// assert_eq!(record.attr("_body_rendered"), Some("<p>hello</p>"));
/// # Ok::<(), markup_field::MarkupError>(())
/// ```
#[derive(Clone, Debug)]
pub struct MarkupField {
    config: FieldConfig,
}

impl MarkupField {
    #[must_use]
    pub fn new(config: FieldConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Bind the field to `record`.
    ///
    /// # Errors
    ///
    /// In transient mode the stored raw text is rendered here, so this fails
    /// when that render fails. Persisted mode never renders on bind.
    pub fn bind<'a, R: Record + ?Sized>(
        &'a self,
        record: &'a mut R,
    ) -> Result<MarkupValue<'a, R>, MarkupError> {
        MarkupValue::bind(record, &self.config)
    }

    /// Re-render persisted output after `record` was read from storage.
    ///
    /// Guards against the rendered attribute having been changed behind the
    /// field's back. Does nothing in transient mode or when
    /// `rerender_on_load` is off.
    ///
    /// # Errors
    ///
    /// Fails when the stored raw text cannot be rendered.
    pub fn load<R: Record + ?Sized>(&self, record: &mut R) -> Result<(), MarkupError> {
        if *self.config.storage() == RenderedStorage::Transient || !self.config.rerender_on_load()
        {
            return Ok(());
        }

        let mut value = MarkupValue::attach(record, &self.config);
        if value.refresh()? {
            tracing::warn!(
                field = self.name(),
                "Persisted rendered output did not match raw text, re-rendered"
            );
        }
        Ok(())
    }

    /// Assign a raw string or a whole markup value.
    ///
    /// A raw string keeps the record's markup type. A [`Markup`] copies its
    /// raw text and markup type and re-renders under this field's
    /// configuration; its rendered text is ignored.
    ///
    /// # Errors
    ///
    /// Fails like [`MarkupValue::set_raw`] and [`MarkupValue::set_markup_type`].
    /// The record is unchanged on error.
    pub fn assign<R: Record + ?Sized>(
        &self,
        record: &mut R,
        value: impl Into<Assignment>,
    ) -> Result<(), MarkupError> {
        let mut bound = MarkupValue::attach(record, &self.config);
        match value.into() {
            Assignment::Raw(raw) => bound.set_raw(raw),
            Assignment::Markup(markup) => bound.replace(markup.raw, markup.markup_type.as_deref()),
        }
    }

    /// Prepare `record` for storage and return the raw text to store.
    ///
    /// Rejects present raw text whose markup type is not accepted, then
    /// brings the rendered output up to date.
    ///
    /// # Errors
    ///
    /// Fails with [`MarkupError::InvalidMarkupType`] for an unaccepted type,
    /// [`MarkupError::MarkupTypeUndetermined`] when none resolves, or the
    /// renderer's error.
    pub fn pre_save<R: Record + ?Sized>(&self, record: &mut R) -> Result<Option<String>, MarkupError> {
        let mut value = MarkupValue::attach(record, &self.config);
        value.validate()?;
        value.refresh()?;
        Ok(value.raw().map(str::to_owned))
    }

    /// Raw text of `record` for string serialization.
    ///
    /// Returns the empty string without a record or when the raw text is null.
    pub fn value_to_string<R: Record + ?Sized>(&self, record: Option<&R>) -> String {
        record
            .and_then(|record| record.attr(self.name()))
            .unwrap_or_default()
            .to_owned()
    }

    /// `(key, label)` pairs for a type selection control.
    ///
    /// Starts with a blank choice when the field has no default type.
    pub fn choices(&self) -> Vec<(&str, &str)> {
        let blank = self
            .config
            .default_markup_type()
            .is_none()
            .then_some(("", BLANK_CHOICE_LABEL));
        blank
            .into_iter()
            .chain(self.config.registry().choices())
            .collect()
    }
}
