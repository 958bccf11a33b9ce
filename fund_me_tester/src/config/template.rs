//!
//! The environment-templated configuration values.
//!

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ConfigError;

/// Matches `${NAME}` references.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Always valid"));

///
/// A configuration string which may reference environment variables as `${NAME}`.
///
/// Templates are resolved only when the value is actually needed, so networks
/// which are not selected do not require their secrets to be set.
///
#[derive(Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(transparent)]
pub struct Template(String);

impl Template {
    ///
    /// A shortcut constructor.
    ///
    pub fn new<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self(value.into())
    }

    ///
    /// Returns the names of the referenced environment variables.
    ///
    pub fn references(&self) -> Vec<&str> {
        REFERENCE
            .captures_iter(self.0.as_str())
            .filter_map(|captures| captures.get(1))
            .map(|name| name.as_str())
            .collect()
    }

    ///
    /// Substitutes every reference using `lookup`.
    ///
    /// An unset or empty variable is an error: no placeholder is ever substituted.
    ///
    pub fn resolve<F>(&self, lookup: F) -> Result<Secret, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in self.references() {
            match lookup(name) {
                Some(value) if !value.is_empty() => continue,
                _ => {
                    return Err(ConfigError::MissingVariable {
                        variable: name.to_owned(),
                    })
                }
            }
        }

        let resolved = REFERENCE.replace_all(self.0.as_str(), |captures: &regex::Captures| {
            lookup(&captures[1]).unwrap_or_default()
        });
        if resolved.contains("${") {
            return Err(ConfigError::MalformedTemplate {
                template: self.0.clone(),
            });
        }

        Ok(Secret(resolved.into_owned()))
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.references().is_empty() {
            write!(f, "Template({:?})", self.0)
        } else {
            write!(f, "Template({:?})", self.references())
        }
    }
}

///
/// A resolved configuration value which must never be printed.
///
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    ///
    /// Returns the underlying value.
    ///
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}
