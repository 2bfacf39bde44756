//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Only the braced form is recognized; a bare `$VAR` is left alone. Values
/// without `${` are returned as-is.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| match std::env::var(name) {
        Ok(found) => Ok(Some(found)),
        Err(_) => Err(UnsetVar(name.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand an optional value in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(current) = value.as_deref() {
        *value = Some(expand_env(current, field)?);
    }
    Ok(())
}

/// Name of a referenced variable that is not set.
struct UnsetVar(String);
