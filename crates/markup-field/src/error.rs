//! Error types for markup fields.

use markup_registry::{RegistryError, RenderError};

/// Error raised by field construction and markup value operations.
///
/// Failed writes leave the record untouched, so callers can report the error
/// and keep using the value.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    /// Registry lookup or customization failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A markup type write was rejected.
    #[error("Invalid markup type: {value} (allowed values: {})", .allowed.join(", "))]
    InvalidMarkupType { value: String, allowed: Vec<String> },

    /// Raw text is present but no markup type can be resolved to render it.
    #[error("Markup type undetermined for field {field}")]
    MarkupTypeUndetermined { field: String },

    /// The renderer failed. Displays the renderer's own error.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Attempted to assign a derived attribute.
    #[error("Attribute {attribute} is read-only")]
    ImmutableAttribute { attribute: String },

    /// Attribute name is not one of `raw`, `markup_type` or `rendered`.
    #[error("Unknown attribute: {name}")]
    UnknownAttribute { name: String },

    /// Field declaration is contradictory.
    #[error("Invalid configuration for field {field}: {message}")]
    Configuration { field: String, message: String },
}
