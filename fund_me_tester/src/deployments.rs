//!
//! The deployment records of contracts on persistent networks.
//!

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use web3::ethabi;
use web3::types::Address;
use web3::types::H256;

use crate::chain::DeployedContract;

///
/// The deployment records of one network, stored as `<root>/<network>/<Contract>.json`.
///
#[derive(Debug, Clone)]
pub struct Deployments {
    /// The network records directory.
    directory: PathBuf,
    /// The network name.
    network: String,
}

///
/// A single deployment record. Unknown fields are ignored.
///
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentRecord {
    /// The contract address.
    address: Address,
    /// The contract interface.
    abi: ethabi::Contract,
    /// The deployment transaction.
    #[serde(default)]
    transaction_hash: Option<H256>,
}

impl Deployments {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(root: &Path, network: &str) -> Self {
        Self {
            directory: root.join(network),
            network: network.to_owned(),
        }
    }

    ///
    /// Reads the record of the contract `name`.
    ///
    pub fn get(&self, name: &str) -> anyhow::Result<DeployedContract> {
        let path = self.directory.join(format!("{name}.json"));
        let data = std::fs::read_to_string(path.as_path()).with_context(|| {
            format!(
                "`{name}` is not deployed on `{}`: cannot read `{}`",
                self.network,
                path.display()
            )
        })?;
        let record: DeploymentRecord = serde_json::from_str(data.as_str())
            .with_context(|| format!("Invalid deployment record `{}`", path.display()))?;

        tracing::info!(
            network = %self.network,
            contract = name,
            address = ?record.address,
            transaction = ?record.transaction_hash,
            "deployment found"
        );
        Ok(DeployedContract::new(
            name.to_owned(),
            record.address,
            record.abi,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::Deployments;

    const RECORD: &str = r#"{
  "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
  "abi": [
    { "type": "function", "name": "fund", "inputs": [], "outputs": [], "stateMutability": "payable" },
    { "type": "function", "name": "withdraw", "inputs": [], "outputs": [], "stateMutability": "nonpayable" }
  ],
  "transactionHash": "0x0707070707070707070707070707070707070707070707070707070707070707",
  "receipt": { "status": 1 },
  "numDeployments": 1
}"#;

    #[test]
    fn reads_a_record() {
        let directory = tempfile::tempdir().expect("Temporary directory");
        std::fs::create_dir_all(directory.path().join("goerli")).expect("Created");
        std::fs::write(directory.path().join("goerli").join("FundMe.json"), RECORD)
            .expect("Written");

        let fund_me = Deployments::new(directory.path(), "goerli")
            .get("FundMe")
            .expect("Deployed");
        assert_eq!(
            fund_me.address,
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
                .parse()
                .expect("Valid address")
        );
        assert!(fund_me.function("fund").is_ok());
        assert!(fund_me.function("withdraw").is_ok());
    }

    #[test]
    fn missing_record_names_the_network() {
        let directory = tempfile::tempdir().expect("Temporary directory");
        let error = Deployments::new(directory.path(), "sepolia")
            .get("FundMe")
            .expect_err("Missing");
        let message = error.to_string();
        assert!(message.contains("FundMe"));
        assert!(message.contains("sepolia"));
    }
}
