//! Building registries and fields from `markup.toml`.

use std::sync::Arc;

use markup_config::{Config, FieldSettings, RegistryConfig};
use markup_registry::{RendererRegistry, defaults};

use crate::config::FieldConfig;
use crate::error::MarkupError;
use crate::field::MarkupField;

/// Build the renderer registry described by `config`.
///
/// Starts from the default renderers, then registers aliases, applies
/// labels and finally restricts and orders the keys. Aliases are registered
/// first so that `types` and `labels` may refer to them.
///
/// # Errors
///
/// Returns [`MarkupError::Registry`] when a key or alias target is not
/// available in this build, or an alias collides with an existing key.
pub fn build_registry(config: &RegistryConfig) -> Result<RendererRegistry, MarkupError> {
    let mut builder = defaults::default_builder();
    for (alias, target) in &config.aliases {
        builder.alias(alias.clone(), target)?;
    }
    for (key, label) in &config.labels {
        builder.relabel(key, label.clone())?;
    }
    if let Some(types) = &config.types {
        builder.retain_ordered(types.as_slice())?;
    }
    Ok(builder.build())
}

impl FieldConfig {
    /// Field configuration for a `[fields.<name>]` table.
    ///
    /// # Errors
    ///
    /// Fails like [`FieldConfigBuilder::build`](crate::FieldConfigBuilder::build).
    pub fn from_settings(
        name: &str,
        settings: &FieldSettings,
        registry: Arc<RendererRegistry>,
    ) -> Result<Self, MarkupError> {
        let mut builder = Self::builder(name, registry)
            .transient(settings.transient)
            .with_escape_html(settings.escape_html);

        if let Some(key) = &settings.markup_type {
            builder = builder.with_markup_type(key);
        }
        if let Some(key) = &settings.default_markup_type {
            builder = builder.with_default_markup_type(key);
        }
        if let Some(attribute) = &settings.markup_type_attribute {
            builder = builder.with_markup_type_attribute(attribute);
        }
        if let Some(attribute) = &settings.rendered_attribute {
            builder = builder.with_rendered_attribute(attribute);
        }
        if let Some(rerender) = settings.rerender_on_load {
            builder = builder.with_rerender_on_load(rerender);
        }

        builder.build()
    }
}

/// Build every field declared in `config`, in name order.
///
/// # Errors
///
/// Returns the first field that fails to build.
pub fn build_fields(
    config: &Config,
    registry: &Arc<RendererRegistry>,
) -> Result<Vec<MarkupField>, MarkupError> {
    config
        .fields
        .iter()
        .map(|(name, settings)| {
            FieldConfig::from_settings(name, settings, Arc::clone(registry)).map(MarkupField::new)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use markup_registry::RegistryError;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{RenderedStorage, TypeSource};

    fn parse(toml: &str) -> Config {
        let config: Config = toml::from_str(toml).unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let registry = build_registry(&RegistryConfig::default()).unwrap();
        let expected = RendererRegistry::with_defaults();
        assert_eq!(
            registry.keys().collect::<Vec<_>>(),
            expected.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_registry_customization() {
        let config = parse(
            r#"
[registry]
types = ["plain", "txt", "html"]

[registry.labels]
txt = "Text"

[registry.aliases]
txt = "plain"
"#,
        );
        let registry = build_registry(&config.registry).unwrap();
        assert_eq!(
            registry.choices().collect::<Vec<_>>(),
            vec![("plain", "Plain text"), ("txt", "Text"), ("html", "HTML")]
        );
        assert_eq!(
            registry.resolve("txt").unwrap().render("a").unwrap(),
            "<p>a</p>"
        );
    }

    #[test]
    fn test_registry_unknown_type() {
        let config = parse("[registry]\ntypes = [\"rst\"]\n");
        let err = build_registry(&config.registry).unwrap_err();
        assert!(matches!(
            err,
            MarkupError::Registry(RegistryError::UnknownMarkupType { key, .. }) if key == "rst"
        ));
    }

    #[test]
    fn test_registry_alias_shadows_default() {
        let config = parse("[registry.aliases]\nhtml = \"plain\"\n");
        let err = build_registry(&config.registry).unwrap_err();
        assert!(matches!(
            err,
            MarkupError::Registry(RegistryError::DuplicateKey { key }) if key == "html"
        ));
    }

    #[test]
    fn test_registry_empty_alias_rejected() {
        // Skips validation to reach the builder directly
        let config: Config = toml::from_str("[registry.aliases]\n\"\" = \"plain\"\n").unwrap();
        assert!(config.validate().is_err());

        let err = build_registry(&config.registry).unwrap_err();
        assert!(matches!(err, MarkupError::Registry(RegistryError::EmptyKey)));
    }

    #[test]
    fn test_build_fields() {
        let config = parse(
            r#"
[fields.body]
default_markup_type = "plain"
markup_type_attribute = "body_format"
escape_html = true
rerender_on_load = false

[fields.summary]
markup_type = "html"
transient = true
"#,
        );
        let registry = Arc::new(build_registry(&config.registry).unwrap());
        let fields = build_fields(&config, &registry).unwrap();

        assert_eq!(fields.len(), 2);
        let body = fields[0].config();
        assert_eq!(body.name(), "body");
        assert_eq!(
            body.type_source(),
            &TypeSource::Selectable {
                attribute: "body_format".to_owned(),
                default: Some("plain".to_owned()),
            }
        );
        assert!(body.escape_html());
        assert!(!body.rerender_on_load());

        let summary = fields[1].config();
        assert_eq!(summary.type_source(), &TypeSource::Fixed("html".to_owned()));
        assert_eq!(summary.storage(), &RenderedStorage::Transient);
    }

    #[test]
    fn test_build_fields_unknown_default() {
        let config = parse("[fields.body]\ndefault_markup_type = \"rst\"\n");
        let registry = Arc::new(build_registry(&config.registry).unwrap());
        let err = build_fields(&config, &registry).unwrap_err();
        assert!(matches!(err, MarkupError::Registry(_)));
    }

    #[test]
    fn test_fields_see_restricted_registry() {
        let config = parse(
            r#"
[registry]
types = ["plain"]

[fields.body]
default_markup_type = "html"
"#,
        );
        let registry = Arc::new(build_registry(&config.registry).unwrap());
        assert!(build_fields(&config, &registry).is_err());
    }
}
