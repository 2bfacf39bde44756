//! Markup value bound to a record.
//!
//! A [`MarkupValue`] is a short-lived handle over one field of one record.
//! Every successful write to the raw text or the markup type re-renders
//! before returning, so `rendered` never lags behind its inputs. Writes are
//! atomic: the render runs first and the record is only touched once it
//! succeeded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{FieldConfig, RenderedStorage, TypeSource};
use crate::error::MarkupError;
use crate::record::Record;

/// Logical attribute of a markup value, addressable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Raw,
    MarkupType,
    Rendered,
}

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::MarkupType => "markup_type",
            Self::Rendered => "rendered",
        }
    }
}

impl FromStr for Attribute {
    type Err = MarkupError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "raw" => Ok(Self::Raw),
            "markup_type" => Ok(Self::MarkupType),
            "rendered" => Ok(Self::Rendered),
            _ => Err(MarkupError::UnknownAttribute {
                name: name.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned snapshot of a markup value.
///
/// Used to copy a value between records and to pass markup around detached
/// from any record. `Display` prints the rendered text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    pub raw: Option<String>,
    pub markup_type: Option<String>,
    pub rendered: Option<String>,
}

impl Markup {
    /// Unrendered markup of the given type.
    #[must_use]
    pub fn new(raw: impl Into<String>, markup_type: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            markup_type: Some(markup_type.into()),
            rendered: None,
        }
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rendered.as_deref().unwrap_or_default())
    }
}

/// A markup field bound to one record.
///
/// Obtained from [`MarkupField::bind`](crate::MarkupField::bind). In persisted
/// mode the rendered output lives in a record attribute; in transient mode it
/// is rendered when the value is bound and kept by the handle.
pub struct MarkupValue<'a, R: Record + ?Sized> {
    record: &'a mut R,
    config: &'a FieldConfig,
    memo: Option<String>,
}

impl<'a, R: Record + ?Sized> MarkupValue<'a, R> {
    /// Attach without rendering anything.
    pub(crate) fn attach(record: &'a mut R, config: &'a FieldConfig) -> Self {
        Self {
            record,
            config,
            memo: None,
        }
    }

    /// Attach, rendering transient output from the stored raw text.
    pub(crate) fn bind(record: &'a mut R, config: &'a FieldConfig) -> Result<Self, MarkupError> {
        let mut value = Self::attach(record, config);
        if *config.storage() == RenderedStorage::Transient {
            value.memo = value.derive()?;
        }
        Ok(value)
    }

    pub fn config(&self) -> &FieldConfig {
        self.config
    }

    /// Current raw text.
    pub fn raw(&self) -> Option<&str> {
        self.record.attr(self.config.name())
    }

    /// Replace the raw text and re-render.
    ///
    /// Writing the current value again is a no-op. Writing `None` clears the
    /// rendered output without invoking a renderer.
    ///
    /// # Errors
    ///
    /// Fails with [`MarkupError::MarkupTypeUndetermined`] when no type can be
    /// resolved, or with the renderer's error. The record is unchanged on error.
    pub fn set_raw(&mut self, value: Option<String>) -> Result<(), MarkupError> {
        if self.raw() == value.as_deref() {
            tracing::debug!(field = self.config.name(), "Raw text unchanged, skipping render");
            return Ok(());
        }

        let rendered = match value.as_deref() {
            Some(raw) => Some(self.config.render(self.resolved_type()?, raw)?),
            None => None,
        };

        let config = self.config;
        self.record.set_attr(config.name(), value);
        self.store_rendered(rendered);
        Ok(())
    }

    /// Resolved markup type.
    ///
    /// The record's selected type wins, then the fixed type, then the default.
    /// An empty selection counts as unset.
    pub fn markup_type(&self) -> Option<&str> {
        match self.config.type_source() {
            TypeSource::Fixed(key) => Some(key.as_str()),
            TypeSource::Selectable { attribute, default } => self
                .record
                .attr(attribute)
                .filter(|key| !key.is_empty())
                .or(default.as_deref()),
        }
    }

    /// Select a markup type and re-render.
    ///
    /// Fixed-type fields only accept their own type, which is a no-op.
    ///
    /// # Errors
    ///
    /// Fails with [`MarkupError::InvalidMarkupType`] if `value` is not an
    /// accepted key, or with the renderer's error. The record is unchanged on
    /// error.
    pub fn set_markup_type(&mut self, value: &str) -> Result<(), MarkupError> {
        let config = self.config;
        config.check_markup_type(value)?;

        let TypeSource::Selectable { attribute, .. } = config.type_source() else {
            return Ok(());
        };
        if self.record.attr(attribute) == Some(value) {
            tracing::debug!(field = config.name(), "Markup type unchanged, skipping render");
            return Ok(());
        }

        // Selecting the type already in effect only needs to be recorded
        if self.markup_type() != Some(value)
            && let Some(raw) = self.raw()
        {
            let rendered = config.render(value, raw)?;
            self.record.set_attr(attribute, Some(value.to_owned()));
            self.store_rendered(Some(rendered));
            return Ok(());
        }

        self.record.set_attr(attribute, Some(value.to_owned()));
        Ok(())
    }

    /// Rendered output. Never renders.
    pub fn rendered(&self) -> Option<&str> {
        match self.config.storage() {
            RenderedStorage::Persisted { attribute } => self.record.attr(attribute),
            RenderedStorage::Transient => self.memo.as_deref(),
        }
    }

    /// Re-render from the current raw text and markup type.
    ///
    /// Returns whether the stored output changed.
    ///
    /// # Errors
    ///
    /// Fails when the type cannot be resolved or the renderer fails.
    pub fn refresh(&mut self) -> Result<bool, MarkupError> {
        let rendered = self.derive()?;
        if self.rendered() == rendered.as_deref() {
            return Ok(false);
        }
        self.store_rendered(rendered);
        Ok(true)
    }

    /// Read a logical attribute by name.
    ///
    /// # Errors
    ///
    /// Fails with [`MarkupError::UnknownAttribute`] for unknown names.
    pub fn get(&self, name: &str) -> Result<Option<&str>, MarkupError> {
        Ok(match name.parse::<Attribute>()? {
            Attribute::Raw => self.raw(),
            Attribute::MarkupType => self.markup_type(),
            Attribute::Rendered => self.rendered(),
        })
    }

    /// Write a logical attribute by name.
    ///
    /// # Errors
    ///
    /// Fails with [`MarkupError::ImmutableAttribute`] for `rendered`, with
    /// [`MarkupError::UnknownAttribute`] for unknown names, and otherwise as
    /// the corresponding setter.
    pub fn set(&mut self, name: &str, value: Option<String>) -> Result<(), MarkupError> {
        match name.parse::<Attribute>()? {
            Attribute::Raw => self.set_raw(value),
            Attribute::MarkupType => match value {
                Some(key) => self.set_markup_type(&key),
                None => Err(MarkupError::InvalidMarkupType {
                    value: String::new(),
                    allowed: self.config.allowed_markup_types(),
                }),
            },
            Attribute::Rendered => Err(MarkupError::ImmutableAttribute {
                attribute: Attribute::Rendered.to_string(),
            }),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Markup {
        Markup {
            raw: self.raw().map(str::to_owned),
            markup_type: self.markup_type().map(str::to_owned),
            rendered: self.rendered().map(str::to_owned),
        }
    }

    /// Replace raw text and, if given, the selected type in one step.
    ///
    /// Assigning the raw text and type already in effect only records the
    /// selection and does not re-render.
    pub(crate) fn replace(
        &mut self,
        raw: Option<String>,
        markup_type: Option<&str>,
    ) -> Result<(), MarkupError> {
        let config = self.config;
        if let Some(key) = markup_type {
            config.check_markup_type(key)?;
        }

        let type_changed = match (markup_type, config.type_source()) {
            (Some(key), TypeSource::Selectable { .. }) => self.markup_type() != Some(key),
            _ => false,
        };
        if !type_changed && self.raw() == raw.as_deref() {
            tracing::debug!(field = config.name(), "Markup unchanged, skipping render");
            if let (Some(key), TypeSource::Selectable { attribute, .. }) =
                (markup_type, config.type_source())
            {
                self.record.set_attr(attribute, Some(key.to_owned()));
            }
            return Ok(());
        }

        let rendered = match raw.as_deref() {
            Some(text) => {
                let key = match markup_type {
                    Some(key) => key,
                    None => self.resolved_type()?,
                };
                Some(config.render(key, text)?)
            }
            None => None,
        };

        self.record.set_attr(config.name(), raw);
        if let (Some(key), TypeSource::Selectable { attribute, .. }) =
            (markup_type, config.type_source())
        {
            self.record.set_attr(attribute, Some(key.to_owned()));
        }
        self.store_rendered(rendered);
        Ok(())
    }

    /// Fail unless present raw text has an accepted markup type.
    pub(crate) fn validate(&self) -> Result<(), MarkupError> {
        if self.raw().is_some() {
            self.config.check_markup_type(self.resolved_type()?)?;
        }
        Ok(())
    }

    fn resolved_type(&self) -> Result<&str, MarkupError> {
        self.markup_type()
            .ok_or_else(|| MarkupError::MarkupTypeUndetermined {
                field: self.config.name().to_owned(),
            })
    }

    fn derive(&self) -> Result<Option<String>, MarkupError> {
        match self.raw() {
            Some(raw) => Ok(Some(self.config.render(self.resolved_type()?, raw)?)),
            None => Ok(None),
        }
    }

    fn store_rendered(&mut self, rendered: Option<String>) {
        let config = self.config;
        match config.storage() {
            RenderedStorage::Persisted { attribute } => self.record.set_attr(attribute, rendered),
            RenderedStorage::Transient => self.memo = rendered,
        }
    }
}

impl<R: Record + ?Sized> fmt::Display for MarkupValue<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rendered().unwrap_or_default())
    }
}

impl<R: Record + ?Sized> fmt::Debug for MarkupValue<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupValue")
            .field("field", &self.config.name())
            .field("raw", &self.raw())
            .field("markup_type", &self.markup_type())
            .field("rendered", &self.rendered())
            .finish()
    }
}
