//!
//! The `check` workflow: validates the project and the selected network
//! without sending transactions.
//!

use colored::Colorize;

use crate::chain::development::fund_me::FundMe;
use crate::chain::remote::RemoteChain;
use crate::chain::Chain;
use crate::config::network::Endpoint;
use crate::config::network::ResolvedNetwork;
use crate::config::ProjectConfig;
use crate::deployments::Deployments;
use crate::environment::Environment;
use crate::explorer::Explorer;
use crate::units;

///
/// The validation results.
///
#[derive(Debug, Default)]
pub struct Checker {
    /// Whether the output is suppressed.
    quiet: bool,
    /// The number of passed checks.
    passed: usize,
    /// The failed checks.
    failures: Vec<String>,
}

impl Checker {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            ..Default::default()
        }
    }

    ///
    /// Runs every check applicable to `network`.
    ///
    pub fn run<F>(
        mut self,
        config: &ProjectConfig,
        network: &ResolvedNetwork,
        lookup: F,
    ) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.ok(
            "network",
            format!(
                "`{}` ({}, chain {}, {} confirmation(s), {} account(s))",
                network.name,
                network.environment,
                network.chain_id,
                network.block_confirmations,
                network.accounts.len()
            ),
        );

        self.check_compilers(config);

        if let Endpoint::Rpc(_) = network.endpoint {
            match RemoteChain::connect(network) {
                Ok(chain) => self.check_accounts(&chain, network),
                Err(error) => self.fail("node", format!("{error:#}")),
            }
        }

        if network.environment == Environment::Live {
            self.check_deployment(config, network, &lookup);
        }

        self.finish()
    }

    fn check_accounts(&mut self, chain: &RemoteChain, network: &ResolvedNetwork) {
        for signer in network.accounts.iter() {
            match chain.balance(signer.address()) {
                Ok(balance) if balance.is_zero() => self.fail(
                    "account",
                    format!("{:?} holds no ETH to pay for gas", signer.address()),
                ),
                Ok(balance) => self.ok(
                    "account",
                    format!("{:?} holds {} ETH", signer.address(), units::format_ether(balance)),
                ),
                Err(error) => self.fail("account", error.to_string()),
            }
        }
    }

    fn check_compilers(&mut self, config: &ProjectConfig) {
        let sources = config.sources_dir();
        match config.solidity.check_sources(sources.as_path()) {
            Ok(coverage) if coverage.is_empty() => self.ok(
                "sources",
                format!("no Solidity sources under `{}`", sources.display()),
            ),
            Ok(coverage) => {
                for source in coverage.into_iter() {
                    let path = source.path.display().to_string();
                    let pragma = source.pragma.as_deref().unwrap_or("no pragma");
                    match source.compiler {
                        Some(ref compiler) => {
                            self.ok("compiler", format!("`{path}` ({pragma}) uses {compiler}"))
                        }
                        None if source.is_covered() => {
                            self.ok("compiler", format!("`{path}` declares no version"))
                        }
                        None => self.fail(
                            "compiler",
                            format!("`{path}` ({pragma}) is not satisfied by any configured compiler"),
                        ),
                    }
                }
            }
            Err(error) => self.fail("sources", format!("{error:#}")),
        }
    }

    fn check_deployment<F>(&mut self, config: &ProjectConfig, network: &ResolvedNetwork, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let deployments = Deployments::new(config.deployments_dir().as_path(), network.name.as_str());
        let fund_me = match deployments.get(FundMe::NAME) {
            Ok(fund_me) => {
                self.ok("deployment", format!("{} at {:?}", FundMe::NAME, fund_me.address));
                fund_me
            }
            Err(error) => {
                self.fail("deployment", format!("{error:#}"));
                return;
            }
        };

        let explorer = match Explorer::for_chain(network.chain_id) {
            Some(explorer) => explorer,
            None => {
                self.ok("explorer", format!("no explorer known for chain {}", network.chain_id));
                return;
            }
        };
        let api_key = match config.etherscan.api_key(lookup) {
            Ok(Some(api_key)) => api_key,
            Ok(None) => {
                self.ok("explorer", "no API key configured, verification not checked".to_owned());
                return;
            }
            Err(error) => {
                self.fail("explorer", error.to_string());
                return;
            }
        };

        let url = explorer.address_url(fund_me.address);
        match explorer.is_verified(fund_me.address, &api_key) {
            Ok(true) => self.ok("explorer", format!("source verified: {url}")),
            Ok(false) => self.fail("explorer", format!("source not verified: {url}")),
            Err(error) => self.fail("explorer", format!("{error:#}")),
        }
    }

    fn ok(&mut self, subject: &str, details: String) {
        self.passed += 1;
        if !self.quiet {
            println!("{:>12} {:<10} {}", "OK".green(), subject, details);
        }
    }

    fn fail(&mut self, subject: &str, details: String) {
        tracing::warn!(subject, %details, "check failed");
        if !self.quiet {
            println!("{:>12} {:<10} {}", "ERROR".bright_red(), subject, details);
        }
        self.failures.push(format!("{subject}: {details}"));
    }

    fn finish(self) -> anyhow::Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        anyhow::bail!(
            "{} of {} checks failed:\n{}",
            self.failures.len(),
            self.failures.len() + self.passed,
            self.failures.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Checker;
    use crate::config::ProjectConfig;

    const CONFIG: &str = r#"
solidity:
  compilers:
    - version: 0.8.8
"#;

    fn project(source: &str) -> (tempfile::TempDir, ProjectConfig) {
        let directory = tempfile::tempdir().expect("Temporary directory");
        let contracts = directory.path().join("contracts");
        std::fs::create_dir_all(contracts.as_path()).expect("Created");
        std::fs::write(contracts.join("FundMe.sol"), source).expect("Written");
        let path = directory.path().join(ProjectConfig::FILE_NAME);
        std::fs::write(path.as_path(), CONFIG).expect("Written");
        let config = ProjectConfig::load(path.as_path()).expect("Loaded");
        (directory, config)
    }

    #[test]
    fn in_process_network_with_covered_sources_passes() {
        let (_directory, config) = project("pragma solidity ^0.8.8;\ncontract FundMe {}\n");
        let network = config.network("hardhat", |_| None).expect("Resolved");
        Checker::new(true)
            .run(&config, &network, |_| None)
            .expect("Passed");
    }

    #[test]
    fn uncovered_pragma_fails() {
        let (_directory, config) = project("pragma solidity ^0.6.6;\ncontract PriceConverter {}\n");
        let network = config.network("hardhat", |_| None).expect("Resolved");
        let error = Checker::new(true)
            .run(&config, &network, |_| None)
            .expect_err("Uncovered");
        assert!(error.to_string().contains("not satisfied"));
    }
}
