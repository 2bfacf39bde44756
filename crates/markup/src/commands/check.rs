//! `markup check` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use markup_config::Config;
use markup_field::{MarkupField, RenderedStorage, TypeSource, build_fields, build_registry};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover markup.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns the first configuration, registry or field error.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        match &config.config_path {
            Some(path) => output.highlight(&format!("Checking {}", path.display())),
            None => output.warning("No markup.toml found, checking defaults"),
        }

        let registry = Arc::new(build_registry(&config.registry)?);
        let fields = build_fields(&config, &registry)?;

        output.info(&format!(
            "Markup types: {}",
            registry.keys().collect::<Vec<_>>().join(", ")
        ));
        for field in &fields {
            output.info(&describe_field(field));
        }
        output.success(&format!(
            "Configuration OK ({} types, {} fields)",
            registry.len(),
            fields.len()
        ));
        Ok(())
    }
}

/// One-line summary of how a field selects its type and stores its output.
fn describe_field(field: &MarkupField) -> String {
    let config = field.config();
    let source = match config.type_source() {
        TypeSource::Fixed(key) => format!("fixed {key}"),
        TypeSource::Selectable {
            attribute,
            default: Some(default),
        } => format!("selectable via {attribute} (default {default})"),
        TypeSource::Selectable {
            attribute,
            default: None,
        } => format!("selectable via {attribute}"),
    };
    let storage = match config.storage() {
        RenderedStorage::Persisted { attribute } => format!("persisted in {attribute}"),
        RenderedStorage::Transient => "transient".to_owned(),
    };
    let escape = if config.escape_html() { ", escaped" } else { "" };
    format!("  {}: {source}, {storage}{escape}", field.name())
}
