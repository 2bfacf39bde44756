//! `markup types` command implementation.

use std::path::PathBuf;

use clap::Args;
use markup_config::Config;
use markup_field::build_registry;
use markup_registry::RendererRegistry;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the types command.
#[derive(Args)]
pub(crate) struct TypesArgs {
    /// Path to configuration file (default: auto-discover markup.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TypesArgs {
    /// Execute the types command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the registry cannot be built.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let registry = build_registry(&config.registry)?;
        Output::new().emit(&format_types(&registry))?;
        Ok(())
    }
}

/// One `key  label` line per type, keys padded to a common width.
fn format_types(registry: &RendererRegistry) -> String {
    let width = registry.keys().map(str::len).max().unwrap_or(0);
    registry
        .choices()
        .map(|(key, label)| format!("{key:<width$}  {label}\n"))
        .collect()
}
