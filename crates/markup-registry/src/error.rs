//! Registry and render error types.

use std::fmt;

/// Error returned by registry construction and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A renderer was registered under an empty key.
    #[error("Markup type key cannot be empty")]
    EmptyKey,
    /// A renderer was registered under a key that is already taken.
    #[error("Duplicate markup type: {key}")]
    DuplicateKey {
        /// The conflicting key.
        key: String,
    },
    /// Lookup of a key that is not registered.
    #[error("Unknown markup type: {key} (allowed values: {})", .allowed.join(", "))]
    UnknownMarkupType {
        /// The requested key.
        key: String,
        /// Registered keys, in registry order.
        allowed: Vec<String>,
    },
}

/// Failure raised by a renderer.
///
/// Wraps the renderer's own error without adding context: `Display` prints
/// the original message and [`source`](std::error::Error::source) returns the
/// original error, so callers see the underlying cause unchanged.
pub struct RenderError {
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl RenderError {
    /// Wrap an error raised by a render function.
    #[must_use]
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Create a render error from a plain message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            source: message.into(),
        }
    }

    /// Downcast the original error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref()
    }

    /// Consume the wrapper and return the original error.
    #[must_use]
    pub fn into_source(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.source
    }
}

impl fmt::Debug for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.source, f)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}
