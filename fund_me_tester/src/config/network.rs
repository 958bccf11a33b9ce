//!
//! The network descriptors.
//!

use crate::chain::signer::Signer;
use crate::environment::Environment;

use super::error::ConfigError;
use super::named_accounts::NamedAccounts;
use super::template::Secret;
use super::template::Template;

///
/// A network entry of the project configuration.
///
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkDescriptor {
    /// The JSON-RPC endpoint. Ignored for the in-process network.
    #[serde(default)]
    pub url: Option<Template>,
    /// The hex-encoded signing keys.
    #[serde(default)]
    pub accounts: Vec<Template>,
    /// The chain identifier.
    pub chain_id: u64,
    /// The number of blocks to wait for after a transaction is included.
    #[serde(default = "NetworkDescriptor::default_block_confirmations")]
    pub block_confirmations: usize,
}

impl NetworkDescriptor {
    /// The built-in in-process network name.
    pub const IN_PROCESS: &'static str = "hardhat";

    /// The chain identifier of development chains.
    pub const DEVELOPMENT_CHAIN_ID: u64 = 31337;

    ///
    /// The default confirmation depth.
    ///
    pub fn default_block_confirmations() -> usize {
        1
    }

    ///
    /// The built-in in-process network.
    ///
    pub fn in_process() -> Self {
        Self {
            url: None,
            accounts: vec![],
            chain_id: Self::DEVELOPMENT_CHAIN_ID,
            block_confirmations: Self::default_block_confirmations(),
        }
    }

    ///
    /// Resolves the descriptor's templates for the network `name`.
    ///
    pub fn resolve<F>(&self, name: &str, lookup: F) -> Result<ResolvedNetwork, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = if name == Self::IN_PROCESS {
            Endpoint::InProcess
        } else {
            let url = self.url.as_ref().ok_or_else(|| ConfigError::MissingUrl {
                network: name.to_owned(),
            })?;
            Endpoint::Rpc(url.resolve(&lookup)?)
        };

        let environment = Environment::of(name);

        let mut accounts = Vec::with_capacity(self.accounts.len());
        for (index, account) in self.accounts.iter().enumerate() {
            let key = account.resolve(&lookup)?;
            let signer =
                Signer::from_hex(key.expose()).map_err(|error| ConfigError::InvalidPrivateKey {
                    network: name.to_owned(),
                    index,
                    reason: error.to_string(),
                })?;
            accounts.push(signer);
        }
        if accounts.is_empty() && environment == Environment::Development {
            accounts = Signer::development_accounts();
        }

        Ok(ResolvedNetwork {
            name: name.to_owned(),
            environment,
            endpoint,
            accounts,
            chain_id: self.chain_id,
            block_confirmations: self.block_confirmations,
        })
    }
}

///
/// Where the network is reached.
///
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// The chain is simulated inside the tester process.
    InProcess,
    /// The chain is reached over JSON-RPC.
    Rpc(Secret),
}

///
/// A selected network with every secret resolved.
///
#[derive(Debug, Clone)]
pub struct ResolvedNetwork {
    /// The network name.
    pub name: String,
    /// The network kind.
    pub environment: Environment,
    /// The network endpoint.
    pub endpoint: Endpoint,
    /// The signing identities.
    pub accounts: Vec<Signer>,
    /// The chain identifier.
    pub chain_id: u64,
    /// The number of blocks to wait for after a transaction is included.
    pub block_confirmations: usize,
}

impl ResolvedNetwork {
    ///
    /// Returns the signer bound to the named account `role`.
    ///
    pub fn named_signer(
        &self,
        named_accounts: &NamedAccounts,
        role: &str,
    ) -> Result<Signer, ConfigError> {
        let index = named_accounts.resolve(role, self.name.as_str())?;
        self.accounts
            .get(index)
            .cloned()
            .ok_or_else(|| ConfigError::AccountIndexOutOfRange {
                role: role.to_owned(),
                network: self.name.clone(),
                index,
                available: self.accounts.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::Endpoint;
    use super::NetworkDescriptor;
    use crate::config::error::ConfigError;
    use crate::config::template::Template;
    use crate::environment::Environment;

    const KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn goerli() -> NetworkDescriptor {
        NetworkDescriptor {
            url: Some(Template::new("${GOERLI_RPC_URL}")),
            accounts: vec![Template::new("${PRIVATE_KEY}")],
            chain_id: 5,
            block_confirmations: 6,
        }
    }

    #[test]
    fn resolves_live_network() {
        let network = goerli()
            .resolve("goerli", |name| match name {
                "GOERLI_RPC_URL" => Some("https://rpc.example".to_owned()),
                "PRIVATE_KEY" => Some(KEY.to_owned()),
                _ => None,
            })
            .expect("Resolved");

        assert_eq!(network.environment, Environment::Live);
        assert_eq!(network.chain_id, 5);
        assert_eq!(network.block_confirmations, 6);
        assert_eq!(network.accounts.len(), 1);
        match network.endpoint {
            Endpoint::Rpc(url) => assert_eq!(url.expose(), "https://rpc.example"),
            Endpoint::InProcess => panic!("Expected an RPC endpoint"),
        }
    }

    #[test]
    fn refuses_missing_private_key() {
        let result = goerli().resolve("goerli", |name| match name {
            "GOERLI_RPC_URL" => Some("https://rpc.example".to_owned()),
            _ => None,
        });
        assert!(matches!(
            result,
            Err(ConfigError::MissingVariable { ref variable }) if variable == "PRIVATE_KEY"
        ));
    }

    #[test]
    fn refuses_placeholder_private_key() {
        let result = goerli().resolve("goerli", |name| match name {
            "GOERLI_RPC_URL" => Some("https://rpc.example".to_owned()),
            "PRIVATE_KEY" => Some("0xkey".to_owned()),
            _ => None,
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPrivateKey { index: 0, .. })
        ));
    }

    #[test]
    fn development_networks_get_default_accounts() {
        let network = NetworkDescriptor::in_process()
            .resolve("hardhat", |_| None)
            .expect("Resolved");
        assert!(matches!(network.endpoint, Endpoint::InProcess));
        assert_eq!(network.environment, Environment::Development);
        assert_eq!(network.accounts.len(), 10);
        assert_eq!(network.chain_id, 31337);
    }

    #[test]
    fn remote_networks_need_a_url() {
        let descriptor = NetworkDescriptor {
            url: None,
            ..goerli()
        };
        assert!(matches!(
            descriptor.resolve("goerli", |_| None),
            Err(ConfigError::MissingUrl { .. })
        ));
    }
}
