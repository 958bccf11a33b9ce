//!
//! The project configuration.
//!

pub mod error;
pub mod named_accounts;
pub mod network;
pub mod reporting;
pub mod solidity;
pub mod template;

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;

use self::error::ConfigError;
use self::named_accounts::NamedAccounts;
use self::network::NetworkDescriptor;
use self::network::ResolvedNetwork;
use self::reporting::EtherscanConfig;
use self::reporting::GasReporterConfig;
use self::solidity::SolidityConfig;

///
/// The project configuration, read once at startup.
///
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// The network used when none is given on the command line.
    #[serde(default = "ProjectConfig::default_network")]
    pub default_network: String,
    /// The configured networks. `hardhat` is always available.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkDescriptor>,
    /// The compiler requirements.
    #[serde(default)]
    pub solidity: SolidityConfig,
    /// The block explorer integration.
    #[serde(default)]
    pub etherscan: EtherscanConfig,
    /// The gas usage reporting.
    #[serde(default)]
    pub gas_reporter: GasReporterConfig,
    /// The role-to-account aliases.
    #[serde(default)]
    pub named_accounts: NamedAccounts,
    /// The project directories.
    #[serde(default)]
    pub paths: PathsConfig,
    /// The directory relative paths are resolved against.
    #[serde(skip)]
    root: PathBuf,
}

///
/// The project directories, relative to the configuration file.
///
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// The contract sources.
    #[serde(default = "PathsConfig::default_sources")]
    pub sources: PathBuf,
    /// The deployment records.
    #[serde(default = "PathsConfig::default_deployments")]
    pub deployments: PathBuf,
}

impl PathsConfig {
    fn default_sources() -> PathBuf {
        PathBuf::from("contracts")
    }

    fn default_deployments() -> PathBuf {
        PathBuf::from("deployments")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: Self::default_sources(),
            deployments: Self::default_deployments(),
        }
    }
}

impl ProjectConfig {
    /// The default configuration file name.
    pub const FILE_NAME: &'static str = "fund-me.yaml";

    ///
    /// The default network name.
    ///
    pub fn default_network() -> String {
        NetworkDescriptor::IN_PROCESS.to_owned()
    }

    ///
    /// Reads the configuration file.
    ///
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read the configuration `{}`", path.display()))?;
        let mut config = Self::parse(data.as_str())
            .with_context(|| format!("Failed to parse the configuration `{}`", path.display()))?;
        config.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    ///
    /// Parses the configuration from a YAML string.
    ///
    pub fn parse(data: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(data)?;
        Ok(config)
    }

    ///
    /// Selects and resolves the network `name`.
    ///
    pub fn network<F>(&self, name: &str, lookup: F) -> Result<ResolvedNetwork, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self.networks.get(name) {
            Some(descriptor) => descriptor.resolve(name, lookup),
            None if name == NetworkDescriptor::IN_PROCESS => {
                NetworkDescriptor::in_process().resolve(name, lookup)
            }
            None => Err(ConfigError::UnknownNetwork {
                name: name.to_owned(),
                available: std::iter::once(NetworkDescriptor::IN_PROCESS)
                    .chain(
                        self.networks
                            .keys()
                            .map(String::as_str)
                            .filter(|network| *network != NetworkDescriptor::IN_PROCESS),
                    )
                    .collect::<Vec<&str>>()
                    .join(", "),
            }),
        }
    }

    ///
    /// The contract sources directory.
    ///
    pub fn sources_dir(&self) -> PathBuf {
        self.root.join(self.paths.sources.as_path())
    }

    ///
    /// The deployment records directory.
    ///
    pub fn deployments_dir(&self) -> PathBuf {
        self.root.join(self.paths.deployments.as_path())
    }

    ///
    /// The gas report file, if one is configured.
    ///
    pub fn gas_report_path(&self) -> Option<PathBuf> {
        self.gas_reporter
            .output_file
            .as_ref()
            .map(|path| self.root.join(path))
    }
}

///
/// Reads a variable from the process environment.
///
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use semver::Version;

    use super::error::ConfigError;
    use super::ProjectConfig;

    const CONFIG: &str = r#"
default_network: hardhat
networks:
  goerli:
    url: "${GOERLI_RPC_URL}"
    accounts: ["${PRIVATE_KEY}"]
    chain_id: 5
    block_confirmations: 6
  localhost:
    url: "http://127.0.0.1:8545/"
    chain_id: 31337
solidity:
  compilers:
    - version: 0.8.8
    - version: 0.6.6
etherscan:
  api_key: "${ETHERSCAN_API_KEY}"
gas_reporter:
  enabled: true
  output_file: gas-reporter.txt
  no_colors: true
  currency: USD
named_accounts:
  deployer:
    default: 0
"#;

    #[test]
    fn parses_project_config() {
        let config = ProjectConfig::parse(CONFIG).expect("Valid config");

        assert_eq!(config.default_network, "hardhat");
        assert_eq!(config.networks.len(), 2);
        assert_eq!(config.networks["goerli"].chain_id, 5);
        assert_eq!(config.networks["goerli"].block_confirmations, 6);
        assert_eq!(config.networks["localhost"].block_confirmations, 1);
        assert_eq!(
            config
                .solidity
                .compilers
                .iter()
                .map(|compiler| compiler.version.clone())
                .collect::<Vec<_>>(),
            vec![Version::new(0, 8, 8), Version::new(0, 6, 6)]
        );
        assert!(config.gas_reporter.enabled);
        assert!(config.gas_reporter.no_colors);
        assert_eq!(config.gas_reporter.currency, "USD");
    }

    #[test]
    fn selecting_a_development_network_needs_no_secrets() {
        let config = ProjectConfig::parse(CONFIG).expect("Valid config");

        let hardhat = config.network("hardhat", |_| None).expect("Resolved");
        assert_eq!(hardhat.chain_id, 31337);

        let localhost = config.network("localhost", |_| None).expect("Resolved");
        assert_eq!(localhost.accounts.len(), 10);
    }

    #[test]
    fn selecting_a_live_network_requires_its_secrets() {
        let config = ProjectConfig::parse(CONFIG).expect("Valid config");
        assert!(matches!(
            config.network("goerli", |_| None),
            Err(ConfigError::MissingVariable { ref variable }) if variable == "GOERLI_RPC_URL"
        ));
    }

    #[test]
    fn rejects_unknown_network() {
        let config = ProjectConfig::parse(CONFIG).expect("Valid config");
        match config.network("mainnet", |_| None) {
            Err(ConfigError::UnknownNetwork { available, .. }) => {
                assert_eq!(available, "hardhat, goerli, localhost")
            }
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn resolves_the_deployer() {
        let config = ProjectConfig::parse(CONFIG).expect("Valid config");
        let network = config.network("hardhat", |_| None).expect("Resolved");
        let deployer = network
            .named_signer(&config.named_accounts, "deployer")
            .expect("Resolved");
        assert_eq!(deployer, network.accounts[0]);
    }

    #[test]
    fn etherscan_key_is_optional_until_used() {
        let config = ProjectConfig::parse(CONFIG).expect("Valid config");
        assert!(config.etherscan.api_key(|_| None).is_err());

        let config = ProjectConfig::parse("default_network: hardhat").expect("Valid config");
        assert!(config
            .etherscan
            .api_key(|_| None)
            .expect("Resolved")
            .is_none());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(ProjectConfig::parse("defaultNetwork: hardhat").is_err());
    }

    #[test]
    fn loads_relative_to_the_file() {
        let directory = tempfile::tempdir().expect("Temporary directory");
        let path = directory.path().join(ProjectConfig::FILE_NAME);
        std::fs::write(path.as_path(), CONFIG).expect("Written");

        let config = ProjectConfig::load(path.as_path()).expect("Loaded");
        assert_eq!(config.deployments_dir(), directory.path().join("deployments"));
        assert_eq!(config.sources_dir(), directory.path().join("contracts"));
        assert_eq!(
            config.gas_report_path(),
            Some(directory.path().join("gas-reporter.txt"))
        );
    }
}
