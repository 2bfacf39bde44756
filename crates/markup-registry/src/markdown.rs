//! Markdown renderer backed by pulldown-cmark.

use pulldown_cmark::{Options, Parser, html};

use crate::error::RenderError;
use crate::renderer::Renderer;

/// CommonMark renderer producing HTML.
///
/// GitHub Flavored Markdown extensions are enabled by default. Raw HTML in
/// the source is passed through unchanged; enable `escape_html` on the field
/// when authors are untrusted.
#[derive(Clone, Copy, Debug)]
pub struct MarkdownRenderer {
    gfm: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(text, self.parser_options());
        let mut out = String::with_capacity(text.len() + text.len() / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
