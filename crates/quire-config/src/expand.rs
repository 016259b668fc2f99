//! `${VAR}` expansion for string settings.
//!
//! Only the braced form is recognised. `${VAR:-default}` falls back to
//! `default` when `VAR` is unset; a plain `${VAR}` that is unset is an error
//! naming the config field it came from.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Strings without `${` are returned untouched, so URLs containing a bare
/// `$` survive as written.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })
}

/// Lookup failure for a single variable.
struct UnsetVar {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("QUIRE_TEST_SIMPLE", "https://example.com");
        }
        let result = expand_env("${QUIRE_TEST_SIMPLE}", "site.url").unwrap();
        assert_eq!(result, "https://example.com");
        unsafe {
            std::env::remove_var("QUIRE_TEST_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_value() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("QUIRE_TEST_DEFAULT_SET", "main");
        }
        let result = expand_env("${QUIRE_TEST_DEFAULT_SET:-dev}", "docs.edit_url").unwrap();
        assert_eq!(result, "main");
        unsafe {
            std::env::remove_var("QUIRE_TEST_DEFAULT_SET");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("QUIRE_TEST_DEFAULT_UNSET");
        }
        let result = expand_env("${QUIRE_TEST_DEFAULT_UNSET:-dev}", "docs.edit_url").unwrap();
        assert_eq!(result, "dev");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("QUIRE_TEST_MISSING");
        }
        let err = expand_env("${QUIRE_TEST_MISSING}", "site.url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("QUIRE_TEST_MISSING"));
        assert!(err.to_string().contains("site.url"));
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("QUIRE_TEST_REPO", "acme/handbook");
        }
        let result = expand_env(
            "https://github.com/${QUIRE_TEST_REPO}/edit/main",
            "docs.edit_url",
        )
        .unwrap();
        assert_eq!(result, "https://github.com/acme/handbook/edit/main");
        unsafe {
            std::env::remove_var("QUIRE_TEST_REPO");
        }
    }

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env("Handbook", "site.title").unwrap(), "Handbook");
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("https://example.com/$path", "site.url").unwrap();
        assert_eq!(result, "https://example.com/$path");
    }
}
