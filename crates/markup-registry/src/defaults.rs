//! Default renderer set.
//!
//! Renderers are registered in a fixed priority order:
//!
//! 1. [`HTML`]: identity, for content that is already HTML
//! 2. [`PLAIN`]: escaped text with autolinks and paragraph markup
//! 3. [`MARKDOWN`]: CommonMark + GFM (requires the `markdown` feature)
//!
//! Each engine is initialized once while the registry is built, through
//! [`RegistryBuilder::try_register`]. An engine that is not compiled in, or
//! whose initialization fails, is left out of the registry instead of
//! failing the build.

use std::sync::Arc;

use crate::error::RenderError;
use crate::plain::render_plain;
use crate::registry::RegistryBuilder;
use crate::renderer::Renderer;

/// Key of the identity renderer.
pub const HTML: &str = "html";

/// Key of the plain-text renderer.
pub const PLAIN: &str = "plain";

/// Key of the markdown renderer.
pub const MARKDOWN: &str = "markdown";

/// Identity renderer for pre-rendered HTML.
///
/// # Errors
///
/// Never fails.
pub fn render_html(text: &str) -> Result<String, RenderError> {
    Ok(text.to_owned())
}

/// Builder seeded with every default renderer available in this build.
#[must_use]
pub fn default_builder() -> RegistryBuilder {
    let mut builder = RegistryBuilder::new();
    builder.try_register(HTML, "HTML", || Ok(Arc::new(render_html)));
    builder.try_register(PLAIN, "Plain text", || Ok(Arc::new(render_plain)));
    builder.try_register(MARKDOWN, "Markdown", markdown_engine);
    builder
}

#[cfg(feature = "markdown")]
#[allow(clippy::unnecessary_wraps)]
fn markdown_engine() -> Result<Arc<dyn Renderer>, RenderError> {
    Ok(Arc::new(crate::markdown::MarkdownRenderer::new()))
}

#[cfg(not(feature = "markdown"))]
fn markdown_engine() -> Result<Arc<dyn Renderer>, RenderError> {
    Err(RenderError::msg("markdown support not compiled in"))
}
