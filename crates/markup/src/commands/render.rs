//! `markup render` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use markup_config::{CliSettings, Config};
use markup_field::{FieldConfig, MarkupField, MemoryRecord, build_registry};
use markup_registry::RendererRegistry;

use crate::error::CliError;
use crate::output::Output;

/// Name of the transient field holding the input text.
const INPUT_FIELD: &str = "input";

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Input file (default: stdin).
    file: Option<PathBuf>,

    /// Markup type to render with (overrides config).
    #[arg(short = 't', long = "type", value_name = "KEY", env = "MARKUP_TYPE")]
    markup_type: Option<String>,

    /// Escape HTML in the input before rendering.
    #[arg(long)]
    escape: bool,

    /// Path to configuration file (default: auto-discover markup.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read, or
    /// rendering fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            default_markup_type: self.markup_type,
            escape_html: self.escape.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let registry = Arc::new(build_registry(&config.registry)?);

        let text = read_input(self.file.as_deref())?;
        let rendered = render_text(&config, &registry, text)?;

        Output::new().emit(&rendered)?;
        Ok(())
    }
}

fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    let text = if let Some(path) = file {
        std::fs::read_to_string(path)?
    } else {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    };
    Ok(text)
}

/// Render `text` as a transient field with the configured type and escaping.
fn render_text(
    config: &Config,
    registry: &Arc<RendererRegistry>,
    text: String,
) -> Result<String, CliError> {
    let markup_type = match &config.render.default_markup_type {
        Some(key) => key.clone(),
        None => registry
            .keys()
            .next()
            .ok_or_else(|| CliError::Validation("No markup types available".to_owned()))?
            .to_owned(),
    };
    tracing::info!(
        markup_type = %markup_type,
        escape_html = config.render.escape_html,
        len = text.len(),
        "Rendering input"
    );

    let field = MarkupField::new(
        FieldConfig::builder(INPUT_FIELD, Arc::clone(registry))
            .with_markup_type(markup_type)
            .with_escape_html(config.render.escape_html)
            .transient(true)
            .build()?,
    );

    let mut record = MemoryRecord::new();
    let mut value = field.bind(&mut record)?;
    value.set_raw(Some(text))?;
    Ok(value.to_string())
}
