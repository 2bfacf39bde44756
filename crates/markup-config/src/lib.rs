//! Configuration management for markup fields.
//!
//! Parses `markup.toml` with serde and discovers it in the current directory
//! or its parents. The file customizes the renderer registry, declares field
//! definitions and sets command-line defaults:
//!
//! ```toml
//! [registry]
//! types = ["markdown", "plain"]
//!
//! [registry.labels]
//! markdown = "Markdown"
//!
//! [registry.aliases]
//! md = "markdown"
//!
//! [render]
//! default_markup_type = "markdown"
//!
//! [fields.body]
//! default_markup_type = "markdown"
//! escape_html = true
//!
//! [fields.summary]
//! markup_type = "plain"
//! transient = true
//! ```
//!
//! ## Environment Variable Expansion
//!
//! Markup type values support `${VAR}` and `${VAR:-default}`:
//! - `render.default_markup_type`
//! - `fields.<name>.markup_type`
//! - `fields.<name>.default_markup_type`
//!
//! Checks that only need the file itself run at load time. Checks against
//! the registry (unknown keys, alias targets) run when the registry and
//! fields are built from this configuration.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "markup.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the markup type used when none is given explicitly.
    pub default_markup_type: Option<String>,
    /// Override HTML escaping before rendering.
    pub escape_html: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Renderer registry customization.
    pub registry: RegistryConfig,
    /// Defaults for ad-hoc rendering.
    pub render: RenderConfig,
    /// Field definitions keyed by field name.
    pub fields: BTreeMap<String, FieldSettings>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Renderer registry customization applied on top of the default renderers.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Keys to keep, in display order. `None` keeps every available renderer.
    pub types: Option<Vec<String>>,
    /// Display labels by key.
    pub labels: BTreeMap<String, String>,
    /// Additional keys mapped to an existing renderer key.
    pub aliases: BTreeMap<String, String>,
}

/// Defaults for rendering outside of a field.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Markup type used when none is given.
    pub default_markup_type: Option<String>,
    /// Escape HTML before rendering.
    pub escape_html: bool,
}

/// Declaration of a single markup field.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldSettings {
    /// Fixed markup type. Conflicts with `default_markup_type`.
    pub markup_type: Option<String>,
    /// Default for the per-record selectable markup type.
    pub default_markup_type: Option<String>,
    /// Record attribute holding the selectable markup type.
    pub markup_type_attribute: Option<String>,
    /// Record attribute persisting the rendered output.
    pub rendered_attribute: Option<String>,
    /// Keep rendered output in memory only.
    pub transient: bool,
    /// Escape HTML before rendering.
    pub escape_html: bool,
    /// Re-render persisted output when a record is loaded.
    pub rerender_on_load: Option<bool>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`fields.body.markup_type`").
        field: String,
        /// Error message (e.g., "${`BODY_TYPE`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `markup.toml` in the current directory and parents,
    /// falling back to defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if parsing,
    /// expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Settings for the field `name`, if declared.
    pub fn field(&self, name: &str) -> Option<&FieldSettings> {
        self.fields.get(name)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(markup_type) = &settings.default_markup_type {
            self.render.default_markup_type = Some(markup_type.clone());
        }
        if let Some(escape_html) = settings.escape_html {
            self.render.escape_html = escape_html;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.exists())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_registry()?;
        if let Some(markup_type) = &self.render.default_markup_type {
            require_non_empty(markup_type, "render.default_markup_type")?;
        }
        for (name, field) in &self.fields {
            field.validate(name)?;
        }
        Ok(())
    }

    fn validate_registry(&self) -> Result<(), ConfigError> {
        if let Some(types) = &self.registry.types {
            for (i, key) in types.iter().enumerate() {
                require_non_empty(key, "registry.types")?;
                if types[..i].contains(key) {
                    return Err(ConfigError::Validation(format!(
                        "registry.types lists '{key}' more than once"
                    )));
                }
            }
        }

        for (key, label) in &self.registry.labels {
            require_non_empty(key, "registry.labels key")?;
            require_non_empty(label, &format!("registry.labels.{key}"))?;
        }

        for (alias, target) in &self.registry.aliases {
            require_non_empty(alias, "registry.aliases key")?;
            require_non_empty(target, &format!("registry.aliases.{alias}"))?;
            if alias == target {
                return Err(ConfigError::Validation(format!(
                    "registry.aliases.{alias} cannot point to itself"
                )));
            }
            if self.registry.aliases.contains_key(target) {
                return Err(ConfigError::Validation(format!(
                    "registry.aliases.{alias} points to another alias '{target}'"
                )));
            }
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(
            &mut self.render.default_markup_type,
            "render.default_markup_type",
        )?;
        for (name, field) in &mut self.fields {
            expand::expand_opt(&mut field.markup_type, &format!("fields.{name}.markup_type"))?;
            expand::expand_opt(
                &mut field.default_markup_type,
                &format!("fields.{name}.default_markup_type"),
            )?;
        }
        Ok(())
    }
}

impl FieldSettings {
    /// Validate a single field declaration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the field when the
    /// declaration is contradictory.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        require_non_empty(name, "fields.<name>")?;

        if self.markup_type.is_some() && self.default_markup_type.is_some() {
            return Err(ConfigError::Validation(format!(
                "fields.{name}: cannot specify both markup_type and default_markup_type"
            )));
        }
        if self.markup_type.is_some() && self.markup_type_attribute.is_some() {
            return Err(ConfigError::Validation(format!(
                "fields.{name}: a fixed markup_type cannot have a markup_type_attribute"
            )));
        }
        if self.transient && self.rendered_attribute.is_some() {
            return Err(ConfigError::Validation(format!(
                "fields.{name}: transient fields cannot have a rendered_attribute"
            )));
        }

        let optional = [
            (&self.markup_type, "markup_type"),
            (&self.default_markup_type, "default_markup_type"),
            (&self.markup_type_attribute, "markup_type_attribute"),
            (&self.rendered_attribute, "rendered_attribute"),
        ];
        for (value, key) in optional {
            if let Some(value) = value {
                require_non_empty(value, &format!("fields.{name}.{key}"))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse("");
        assert!(config.registry.types.is_none());
        assert!(config.registry.labels.is_empty());
        assert!(config.fields.is_empty());
        assert!(!config.render.escape_html);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_registry_config() {
        let config = parse(
            r#"
[registry]
types = ["markdown", "plain"]

[registry.labels]
markdown = "Markdown"

[registry.aliases]
md = "markdown"
"#,
        );
        assert_eq!(
            config.registry.types,
            Some(vec!["markdown".to_owned(), "plain".to_owned()])
        );
        assert_eq!(config.registry.labels["markdown"], "Markdown");
        assert_eq!(config.registry.aliases["md"], "markdown");
    }

    #[test]
    fn test_parse_fields() {
        let config = parse(
            r#"
[fields.body]
default_markup_type = "markdown"
escape_html = true

[fields.summary]
markup_type = "plain"
transient = true
"#,
        );
        assert_eq!(
            config.field("body"),
            Some(&FieldSettings {
                default_markup_type: Some("markdown".to_owned()),
                escape_html: true,
                ..FieldSettings::default()
            })
        );
        let summary = config.field("summary").unwrap();
        assert_eq!(summary.markup_type.as_deref(), Some("plain"));
        assert!(summary.transient);
        assert!(summary.rerender_on_load.is_none());
        assert!(config.field("missing").is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<Config, _> = toml::from_str("[fields.body]\nmarkup = \"md\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_field_fixed_and_default_conflict() {
        let config = parse(
            r#"
[fields.body]
markup_type = "plain"
default_markup_type = "markdown"
"#,
        );
        assert_validation_error(&config, &["fields.body", "both"]);
    }

    #[test]
    fn test_field_fixed_with_attribute_conflict() {
        let config = parse(
            r#"
[fields.body]
markup_type = "plain"
markup_type_attribute = "body_type"
"#,
        );
        assert_validation_error(&config, &["fields.body", "markup_type_attribute"]);
    }

    #[test]
    fn test_transient_with_rendered_attribute_conflict() {
        let config = parse(
            r#"
[fields.body]
transient = true
rendered_attribute = "_body_html"
"#,
        );
        assert_validation_error(&config, &["transient", "rendered_attribute"]);
    }

    #[test]
    fn test_empty_attribute_rejected() {
        let config = parse(
            r#"
[fields.body]
rendered_attribute = ""
"#,
        );
        assert_validation_error(&config, &["fields.body.rendered_attribute", "empty"]);
    }

    #[test]
    fn test_registry_types_repeated() {
        let config = parse(
            r#"
[registry]
types = ["plain", "plain"]
"#,
        );
        assert_validation_error(&config, &["registry.types", "plain"]);
    }

    #[test]
    fn test_registry_empty_label() {
        let config = parse(
            r#"
[registry.labels]
plain = ""
"#,
        );
        assert_validation_error(&config, &["registry.labels.plain", "empty"]);
    }

    #[test]
    fn test_registry_empty_label_key() {
        let config = parse(
            r#"
[registry.labels]
"" = "Nothing"
"#,
        );
        assert_validation_error(&config, &["registry.labels key", "empty"]);
    }

    #[test]
    fn test_registry_empty_alias_key() {
        let config = parse(
            r#"
[registry.aliases]
"" = "plain"
"#,
        );
        assert_validation_error(&config, &["registry.aliases key", "empty"]);
    }

    #[test]
    fn test_registry_alias_to_alias() {
        let config = parse(
            r#"
[registry.aliases]
md = "markdown"
mdown = "md"
"#,
        );
        assert_validation_error(&config, &["registry.aliases.mdown", "another alias"]);
    }

    #[test]
    fn test_registry_alias_to_itself() {
        let config = parse(
            r#"
[registry.aliases]
md = "md"
"#,
        );
        assert_validation_error(&config, &["registry.aliases.md", "itself"]);
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = parse("[render]\ndefault_markup_type = \"plain\"\n");
        config.apply_cli_settings(&CliSettings {
            default_markup_type: Some("markdown".to_owned()),
            escape_html: Some(true),
        });
        assert_eq!(config.render.default_markup_type.as_deref(), Some("markdown"));
        assert!(config.render.escape_html);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = parse("[render]\ndefault_markup_type = \"plain\"\n");
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.render.default_markup_type.as_deref(), Some("plain"));
        assert!(!config.render.escape_html);
    }

    #[test]
    fn test_expand_env_vars_field_types() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MARKUP_CONFIG_BODY_TYPE", "markdown");
        }

        let mut config = parse(
            r#"
[fields.body]
default_markup_type = "${MARKUP_CONFIG_BODY_TYPE}"

[fields.summary]
markup_type = "${MARKUP_CONFIG_SUMMARY_TYPE:-plain}"
"#,
        );
        config.expand_env_vars().unwrap();

        assert_eq!(
            config.fields["body"].default_markup_type.as_deref(),
            Some("markdown")
        );
        assert_eq!(config.fields["summary"].markup_type.as_deref(), Some("plain"));

        unsafe {
            std::env::remove_var("MARKUP_CONFIG_BODY_TYPE");
        }
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[fields.body]\ndefault_markup_type = \"plain\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(
            config.fields["body"].default_markup_type.as_deref(),
            Some("plain")
        );
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[fields.body]\nmarkup_type = \"plain\"\ndefault_markup_type = \"plain\"\n",
        )
        .unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[fields.body\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_from(&nested),
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }
}
