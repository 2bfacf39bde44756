//! Static field configuration.

use std::sync::Arc;

use markup_registry::{RendererRegistry, escape_html};

use crate::error::MarkupError;

/// Where a field takes its markup type from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSource {
    /// Every record uses this type.
    Fixed(String),
    /// Each record selects its type through a sibling attribute.
    Selectable {
        /// Record attribute holding the selected key.
        attribute: String,
        /// Used while the attribute is unset.
        default: Option<String>,
    },
}

/// Where a field keeps its rendered output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedStorage {
    /// Written to a sibling record attribute on every change.
    Persisted {
        /// Record attribute holding the rendered output.
        attribute: String,
    },
    /// Held by the bound value only.
    Transient,
}

/// Resolved configuration of one markup field.
///
/// Constructed through [`FieldConfig::builder`], which rejects contradictory
/// or unresolvable declarations before any record is touched.
#[derive(Clone, Debug)]
pub struct FieldConfig {
    name: String,
    type_source: TypeSource,
    storage: RenderedStorage,
    escape_html: bool,
    rerender_on_load: bool,
    registry: Arc<RendererRegistry>,
}

impl FieldConfig {
    /// Start configuring field `name` over `registry`.
    #[must_use]
    pub fn builder(name: impl Into<String>, registry: Arc<RendererRegistry>) -> FieldConfigBuilder {
        FieldConfigBuilder {
            name: name.into(),
            registry,
            markup_type: None,
            default_markup_type: None,
            markup_type_attribute: None,
            rendered_attribute: None,
            transient: false,
            escape_html: false,
            rerender_on_load: true,
        }
    }

    /// Field name, also the record attribute holding the raw text.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_source(&self) -> &TypeSource {
        &self.type_source
    }

    pub fn storage(&self) -> &RenderedStorage {
        &self.storage
    }

    /// Whether raw text is HTML-escaped before rendering.
    pub fn escape_html(&self) -> bool {
        self.escape_html
    }

    /// Whether loading a record re-renders persisted output.
    pub fn rerender_on_load(&self) -> bool {
        self.rerender_on_load
    }

    pub fn registry(&self) -> &Arc<RendererRegistry> {
        &self.registry
    }

    /// Type used when a record has not selected one.
    pub fn default_markup_type(&self) -> Option<&str> {
        match &self.type_source {
            TypeSource::Fixed(key) => Some(key.as_str()),
            TypeSource::Selectable { default, .. } => default.as_deref(),
        }
    }

    /// Check that `value` may be written as this field's markup type.
    pub(crate) fn check_markup_type(&self, value: &str) -> Result<(), MarkupError> {
        let accepted = match &self.type_source {
            TypeSource::Fixed(key) => key == value,
            TypeSource::Selectable { .. } => self.registry.contains(value),
        };
        if accepted {
            return Ok(());
        }
        Err(MarkupError::InvalidMarkupType {
            value: value.to_owned(),
            allowed: self.allowed_markup_types(),
        })
    }

    /// Keys that may be written as this field's markup type.
    pub(crate) fn allowed_markup_types(&self) -> Vec<String> {
        match &self.type_source {
            TypeSource::Fixed(key) => vec![key.clone()],
            TypeSource::Selectable { .. } => self.registry.keys().map(str::to_owned).collect(),
        }
    }

    /// Render `raw` with the renderer registered under `markup_type`.
    pub(crate) fn render(&self, markup_type: &str, raw: &str) -> Result<String, MarkupError> {
        let entry = self.registry.resolve(markup_type)?;
        tracing::trace!(field = %self.name, markup_type, len = raw.len(), "Rendering");
        let rendered = if self.escape_html {
            entry.render(&escape_html(raw))?
        } else {
            entry.render(raw)?
        };
        Ok(rendered)
    }
}

/// Builder for [`FieldConfig`].
#[derive(Debug)]
pub struct FieldConfigBuilder {
    name: String,
    registry: Arc<RendererRegistry>,
    markup_type: Option<String>,
    default_markup_type: Option<String>,
    markup_type_attribute: Option<String>,
    rendered_attribute: Option<String>,
    transient: bool,
    escape_html: bool,
    rerender_on_load: bool,
}

impl FieldConfigBuilder {
    /// Fix the markup type for every record.
    #[must_use]
    pub fn with_markup_type(mut self, key: impl Into<String>) -> Self {
        self.markup_type = Some(key.into());
        self
    }

    /// Type used while a record has not selected one.
    #[must_use]
    pub fn with_default_markup_type(mut self, key: impl Into<String>) -> Self {
        self.default_markup_type = Some(key.into());
        self
    }

    /// Record attribute holding the selected type.
    ///
    /// Defaults to `<field>_markup_type`.
    #[must_use]
    pub fn with_markup_type_attribute(mut self, name: impl Into<String>) -> Self {
        self.markup_type_attribute = Some(name.into());
        self
    }

    /// Record attribute persisting the rendered output.
    ///
    /// Defaults to `_<field>_rendered`.
    #[must_use]
    pub fn with_rendered_attribute(mut self, name: impl Into<String>) -> Self {
        self.rendered_attribute = Some(name.into());
        self
    }

    /// Keep rendered output in the bound value instead of the record.
    #[must_use]
    pub fn transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    #[must_use]
    pub fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    #[must_use]
    pub fn with_rerender_on_load(mut self, rerender: bool) -> Self {
        self.rerender_on_load = rerender;
        self
    }

    /// Validate the declaration and resolve defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::Configuration`] for contradictory settings and
    /// [`MarkupError::Registry`] if the fixed or default type is not registered.
    pub fn build(self) -> Result<FieldConfig, MarkupError> {
        let fail = |message: &str| MarkupError::Configuration {
            field: self.name.clone(),
            message: message.to_owned(),
        };

        if self.name.is_empty() {
            return Err(fail("field name cannot be empty"));
        }
        if self.markup_type.is_some() && self.default_markup_type.is_some() {
            return Err(fail("cannot specify both markup_type and default_markup_type"));
        }
        if self.markup_type.is_some() && self.markup_type_attribute.is_some() {
            return Err(fail("a fixed markup_type cannot have a markup_type_attribute"));
        }
        if self.transient && self.rendered_attribute.is_some() {
            return Err(fail("transient fields cannot have a rendered_attribute"));
        }

        let type_source = if let Some(key) = self.markup_type {
            self.registry.resolve(&key)?;
            TypeSource::Fixed(key)
        } else {
            if let Some(key) = &self.default_markup_type {
                self.registry.resolve(key)?;
            }
            TypeSource::Selectable {
                attribute: self
                    .markup_type_attribute
                    .unwrap_or_else(|| format!("{}_markup_type", self.name)),
                default: self.default_markup_type,
            }
        };

        let storage = if self.transient {
            RenderedStorage::Transient
        } else {
            RenderedStorage::Persisted {
                attribute: self
                    .rendered_attribute
                    .unwrap_or_else(|| format!("_{}_rendered", self.name)),
            }
        };

        let mut attributes = vec![self.name.as_str()];
        if let TypeSource::Selectable { attribute, .. } = &type_source {
            attributes.push(attribute.as_str());
        }
        if let RenderedStorage::Persisted { attribute } = &storage {
            attributes.push(attribute.as_str());
        }
        for (i, attribute) in attributes.iter().enumerate() {
            if attribute.is_empty() {
                return Err(fail("attribute names cannot be empty"));
            }
            if attributes[..i].contains(attribute) {
                return Err(fail(&format!("attribute '{attribute}' is used twice")));
            }
        }

        Ok(FieldConfig {
            name: self.name,
            type_source,
            storage,
            escape_html: self.escape_html,
            rerender_on_load: self.rerender_on_load,
            registry: self.registry,
        })
    }
}
