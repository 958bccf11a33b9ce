//!
//! The Solidity compiler requirements.
//!

use std::path::Path;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use semver::VersionReq;

/// Matches `pragma solidity <requirement>;`.
static PRAGMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pragma\s+solidity\s+([^;]+);").expect("Always valid"));

///
/// The compiler versions the project sources must be buildable with.
///
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(from = "SolidityConfigRepr")]
pub struct SolidityConfig {
    /// The configured compilers, in declaration order.
    pub compilers: Vec<CompilerSettings>,
}

///
/// A single compiler entry.
///
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CompilerSettings {
    /// The compiler version.
    pub version: Version,
}

///
/// Either `solidity: 0.8.8` or `solidity: { compilers: [...] }`.
///
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SolidityConfigRepr {
    Single(Version),
    Multiple { compilers: Vec<CompilerSettings> },
}

impl From<SolidityConfigRepr> for SolidityConfig {
    fn from(repr: SolidityConfigRepr) -> Self {
        match repr {
            SolidityConfigRepr::Single(version) => Self {
                compilers: vec![CompilerSettings { version }],
            },
            SolidityConfigRepr::Multiple { compilers } => Self { compilers },
        }
    }
}

///
/// The compiler chosen for one source file.
///
#[derive(Debug, Clone)]
pub struct SourceCoverage {
    /// The source file path.
    pub path: PathBuf,
    /// The `pragma solidity` requirement, if the file declares one.
    pub pragma: Option<String>,
    /// The selected compiler.
    pub compiler: Option<Version>,
}

impl SourceCoverage {
    ///
    /// Whether a configured compiler can build the file.
    ///
    pub fn is_covered(&self) -> bool {
        self.pragma.is_none() || self.compiler.is_some()
    }
}

impl SolidityConfig {
    ///
    /// Selects the newest configured compiler satisfying a `pragma solidity` requirement.
    ///
    pub fn select(&self, pragma: &str) -> anyhow::Result<Option<&Version>> {
        let requirements = Self::requirements(pragma)?;
        Ok(self
            .compilers
            .iter()
            .map(|compiler| &compiler.version)
            .filter(|version| {
                requirements
                    .iter()
                    .any(|requirement| requirement.matches(version))
            })
            .max())
    }

    ///
    /// Checks every `.sol` file under `sources` against the configured compilers.
    ///
    pub fn check_sources(&self, sources: &Path) -> anyhow::Result<Vec<SourceCoverage>> {
        let pattern = sources.join("**").join("*.sol");
        let pattern = pattern.to_string_lossy();

        let mut coverage = Vec::new();
        for path in glob::glob(pattern.as_ref())? {
            let path = path?;
            let source = std::fs::read_to_string(path.as_path())
                .map_err(|error| anyhow::anyhow!("Failed to read `{}`: {error}", path.display()))?;

            let pragma = PRAGMA
                .captures(source.as_str())
                .and_then(|captures| captures.get(1))
                .map(|pragma| pragma.as_str().trim().to_owned());
            let compiler = match pragma {
                Some(ref pragma) => self
                    .select(pragma)
                    .map_err(|error| anyhow::anyhow!("`{}`: {error}", path.display()))?
                    .cloned(),
                None => None,
            };

            coverage.push(SourceCoverage {
                path,
                pragma,
                compiler,
            });
        }

        Ok(coverage)
    }

    ///
    /// Translates a Solidity version pragma into semver requirements, one per `||` alternative.
    ///
    /// A bare version means an exact match in Solidity, unlike in semver.
    ///
    fn requirements(pragma: &str) -> anyhow::Result<Vec<VersionReq>> {
        pragma
            .split("||")
            .map(|alternative| {
                let mut comparators = Vec::new();
                let mut operator: Option<&str> = None;
                for token in alternative.split_whitespace() {
                    if token.chars().all(|c| "^~<>=".contains(c)) {
                        operator = Some(token);
                        continue;
                    }
                    let comparator = match operator.take() {
                        Some(operator) => format!("{operator}{token}"),
                        None if token.starts_with(|c: char| c.is_ascii_digit()) => {
                            format!("={token}")
                        }
                        None => token.to_owned(),
                    };
                    comparators.push(comparator);
                }

                if comparators.is_empty() {
                    anyhow::bail!("Empty version requirement in `{pragma}`");
                }
                VersionReq::parse(comparators.join(", ").as_str())
                    .map_err(|error| anyhow::anyhow!("Invalid pragma `{pragma}`: {error}"))
            })
            .collect()
    }
}
