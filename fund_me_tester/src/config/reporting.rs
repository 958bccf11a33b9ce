//!
//! The third-party reporting integrations.
//!

use std::path::PathBuf;

use super::error::ConfigError;
use super::template::Secret;
use super::template::Template;

///
/// The block explorer integration.
///
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EtherscanConfig {
    /// The explorer API key.
    #[serde(default)]
    pub api_key: Option<Template>,
}

impl EtherscanConfig {
    ///
    /// Resolves the API key, if one is configured.
    ///
    pub fn api_key<F>(&self, lookup: F) -> Result<Option<Secret>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api_key
            .as_ref()
            .map(|api_key| api_key.resolve(lookup))
            .transpose()
    }
}

///
/// The gas usage reporting.
///
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GasReporterConfig {
    /// Whether the report is produced.
    #[serde(default)]
    pub enabled: bool,
    /// The report file. Printed to the console when absent.
    #[serde(default)]
    pub output_file: Option<PathBuf>,
    /// Whether ANSI colors are stripped from the report.
    #[serde(default)]
    pub no_colors: bool,
    /// The fiat currency label of the report.
    #[serde(default = "GasReporterConfig::default_currency")]
    pub currency: String,
}

impl GasReporterConfig {
    ///
    /// The default fiat currency label.
    ///
    pub fn default_currency() -> String {
        "USD".to_owned()
    }
}

impl Default for GasReporterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_file: None,
            no_colors: false,
            currency: Self::default_currency(),
        }
    }
}
