//!
//! The named accounts.
//!

use std::collections::BTreeMap;

use super::error::ConfigError;

///
/// The role-to-account-index aliases, e.g. `deployer: { default: 0 }`.
///
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(transparent)]
pub struct NamedAccounts(BTreeMap<String, AccountAlias>);

///
/// A single role binding.
///
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
pub enum AccountAlias {
    /// The same index on every network.
    Index(usize),
    /// Per-network indexes with an optional `default` fallback.
    PerNetwork(BTreeMap<String, usize>),
}

impl NamedAccounts {
    /// The key of the fallback index.
    pub const DEFAULT_KEY: &'static str = "default";

    /// The role which deploys contracts and owns them.
    pub const DEPLOYER: &'static str = "deployer";

    ///
    /// Resolves the account index of `role` on `network`.
    ///
    pub fn resolve(&self, role: &str, network: &str) -> Result<usize, ConfigError> {
        let alias = self
            .0
            .get(role)
            .ok_or_else(|| ConfigError::UnknownNamedAccount {
                role: role.to_owned(),
            })?;

        match alias {
            AccountAlias::Index(index) => Ok(*index),
            AccountAlias::PerNetwork(indexes) => indexes
                .get(network)
                .or_else(|| indexes.get(Self::DEFAULT_KEY))
                .copied()
                .ok_or_else(|| ConfigError::NoIndexForNetwork {
                    role: role.to_owned(),
                    network: network.to_owned(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NamedAccounts;
    use crate::config::error::ConfigError;

    fn accounts() -> NamedAccounts {
        serde_yaml::from_str(
            r#"
deployer:
  default: 0
user:
  default: 1
  goerli: 0
auditor: 2
treasurer:
  sepolia: 3
"#,
        )
        .expect("Valid named accounts")
    }

    #[test]
    fn resolves_default_index() {
        assert_eq!(accounts().resolve("deployer", "goerli").expect("Resolved"), 0);
        assert_eq!(accounts().resolve("user", "hardhat").expect("Resolved"), 1);
    }

    #[test]
    fn prefers_network_override() {
        assert_eq!(accounts().resolve("user", "goerli").expect("Resolved"), 0);
    }

    #[test]
    fn accepts_plain_index() {
        assert_eq!(accounts().resolve("auditor", "goerli").expect("Resolved"), 2);
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(matches!(
            accounts().resolve("owner", "goerli"),
            Err(ConfigError::UnknownNamedAccount { .. })
        ));
    }

    #[test]
    fn rejects_role_without_index() {
        assert!(matches!(
            accounts().resolve("treasurer", "goerli"),
            Err(ConfigError::NoIndexForNetwork { .. })
        ));
    }
}
