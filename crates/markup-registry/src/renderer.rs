//! Renderer trait and registry entries.

use std::fmt;
use std::sync::Arc;

use crate::error::RenderError;

/// Converts raw markup text into rendered output.
///
/// Implementations must be pure: the same input always produces the same
/// output. Stored rendered text is compared against a fresh render of the raw
/// text, so any non-determinism shows up as drift.
///
/// Closures of the form `Fn(&str) -> Result<String, RenderError>` implement
/// this trait directly.
pub trait Renderer: Send + Sync {
    /// Render `text`.
    fn render(&self, text: &str) -> Result<String, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&str) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, text: &str) -> Result<String, RenderError> {
        self(text)
    }
}

/// A renderer registered under a markup type key.
///
/// Cloning is cheap; the renderer itself is shared.
#[derive(Clone)]
pub struct RendererEntry {
    key: String,
    label: String,
    renderer: Arc<dyn Renderer>,
}

impl RendererEntry {
    /// Create an entry whose label is the key itself.
    pub fn new(key: impl Into<String>, renderer: impl Renderer + 'static) -> Self {
        Self::from_shared(key, Arc::new(renderer))
    }

    /// Create an entry around an already shared renderer.
    pub fn from_shared(key: impl Into<String>, renderer: Arc<dyn Renderer>) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            renderer,
        }
    }

    /// Set the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Markup type key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable label for type selection controls.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Shared handle to the underlying renderer.
    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// Render `text` with this entry's renderer.
    pub fn render(&self, text: &str) -> Result<String, RenderError> {
        self.renderer.render(text)
    }
}

impl fmt::Debug for RendererEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererEntry")
            .field("key", &self.key)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
