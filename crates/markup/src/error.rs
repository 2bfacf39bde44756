//! CLI error types.

use markup_config::ConfigError;
use markup_field::MarkupError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Markup(#[from] MarkupError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),
}
