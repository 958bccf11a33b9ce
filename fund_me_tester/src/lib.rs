//!
//! The fund me tester library.
//!

pub(crate) mod chain;
pub(crate) mod check;
pub(crate) mod config;
pub(crate) mod deployments;
pub(crate) mod environment;
pub(crate) mod explorer;
pub(crate) mod filters;
pub(crate) mod gas_reporter;
pub(crate) mod scenario;
pub(crate) mod summary;
pub mod telemetry;
pub(crate) mod units;
pub(crate) mod workflow;

use web3::types::U256;

pub use crate::chain::development::fund_me::FundMe;
pub use crate::chain::development::DevelopmentChain;
pub use crate::chain::remote::RemoteChain;
pub use crate::chain::signer::Signer;
pub use crate::chain::DeployedContract;
pub use crate::check::Checker;
pub use crate::config::named_accounts::NamedAccounts;
pub use crate::config::network::Endpoint;
pub use crate::config::network::ResolvedNetwork;
pub use crate::config::process_env;
pub use crate::config::ProjectConfig;
pub use crate::deployments::Deployments;
pub use crate::environment::Environment;
pub use crate::filters::Filters;
pub use crate::gas_reporter::GasReporter;
pub use crate::scenario::Group;
pub use crate::summary::Summary;
pub use crate::workflow::Workflow;

use crate::scenario::Fixture;
use crate::scenario::Scenario;
use crate::scenario::ScenarioContext;
use crate::scenario::ScenarioError;

/// The process exit code on success.
pub const EXIT_CODE_SUCCESS: i32 = 0;

/// The process exit code on failure.
pub const EXIT_CODE_FAILURE: i32 = 1;

///
/// The chain the scenarios run against.
///
pub enum Target {
    /// The in-process chain. Every unit scenario gets a copy with fresh deployments.
    InProcess(DevelopmentChain),
    /// A node reached over JSON-RPC.
    Remote {
        /// The connected chain.
        chain: RemoteChain,
        /// The recorded deployment, loaded on live networks only.
        fund_me: Option<DeployedContract>,
    },
}

impl Target {
    ///
    /// Sets up the chain of `network`, connecting to it if it is remote.
    ///
    pub fn prepare(config: &ProjectConfig, network: &ResolvedNetwork) -> anyhow::Result<Self> {
        match network.endpoint {
            Endpoint::InProcess => Ok(Self::InProcess(DevelopmentChain::new(
                network.name.clone(),
                network.chain_id,
                network.accounts.as_slice(),
            ))),
            Endpoint::Rpc(_) => {
                let chain = RemoteChain::connect(network)?;
                let fund_me = match network.environment {
                    Environment::Live => Some(
                        Deployments::new(config.deployments_dir().as_path(), network.name.as_str())
                            .get(FundMe::NAME)?,
                    ),
                    Environment::Development => None,
                };
                Ok(Self::Remote { chain, fund_me })
            }
        }
    }
}

///
/// The fund me tester.
///
pub struct FundMeTester {
    /// The summary.
    pub summary: Summary,
    /// The filters.
    pub filters: Filters,
    /// The gas report collector.
    pub gas_reporter: GasReporter,
    /// The selected network.
    network: ResolvedNetwork,
    /// The deployer and owner account.
    deployer: Signer,
}

impl FundMeTester {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(
        summary: Summary,
        filters: Filters,
        gas_reporter: GasReporter,
        network: ResolvedNetwork,
        deployer: Signer,
    ) -> Self {
        Self {
            summary,
            filters,
            gas_reporter,
            network,
            deployer,
        }
    }

    ///
    /// Runs the selected scenarios one after another.
    ///
    pub fn run(&mut self, target: &mut Target) {
        for scenario in scenario::all() {
            let name = scenario.full_name();
            if !self.filters.check_name(name.as_str()) || !self.filters.check_group(scenario.group) {
                continue;
            }

            match (scenario.group, &mut *target) {
                (Group::Staging, _) if self.network.environment == Environment::Development => {
                    self.summary
                        .ignored(name, "staging scenarios run on live networks only");
                }
                (_, Target::InProcess(pristine)) => {
                    self.run_in_process(&scenario, name, pristine);
                }
                (Group::Staging, Target::Remote {
                    chain,
                    fund_me: Some(fund_me),
                }) => {
                    let fund_me = fund_me.clone();
                    self.run_remote(&scenario, name, chain, fund_me);
                }
                (Group::Staging, Target::Remote { fund_me: None, .. }) => {
                    self.summary
                        .invalid(name, format!("{} is not deployed", FundMe::NAME));
                }
                (Group::Unit, Target::Remote { .. }) => {
                    self.summary
                        .ignored(name, "unit scenarios run on the in-process network only");
                }
            }
        }
    }

    ///
    /// Runs a scenario on a copy of the pristine chain with fresh deployments.
    ///
    fn run_in_process(&mut self, scenario: &Scenario, name: String, pristine: &DevelopmentChain) {
        let mut chain = pristine.clone();
        let fixture = match Fixture::deploy(&mut chain, &self.deployer) {
            Ok(fixture) => fixture,
            Err(error) => {
                self.summary.invalid(name, error);
                return;
            }
        };

        tracing::info!(scenario = %name, network = %self.network.name, "running");
        let (result, transactions, gas) = {
            let mut context = ScenarioContext::new(
                &mut chain,
                &mut self.gas_reporter,
                fixture.fund_me,
                Some(fixture.price_feed),
                self.deployer.clone(),
                self.network.accounts.clone(),
            );
            let result = (scenario.run)(&mut context);
            (result, context.transactions(), context.gas())
        };
        self.record(scenario, name, result, transactions, gas);
    }

    ///
    /// Runs a scenario against the recorded deployment of a remote chain.
    ///
    fn run_remote(
        &mut self,
        scenario: &Scenario,
        name: String,
        chain: &mut RemoteChain,
        fund_me: DeployedContract,
    ) {
        tracing::info!(
            scenario = %name,
            network = %self.network.name,
            fund_me = ?fund_me.address,
            "running"
        );
        let (result, transactions, gas) = {
            let mut context = ScenarioContext::new(
                chain,
                &mut self.gas_reporter,
                fund_me,
                None,
                self.deployer.clone(),
                self.network.accounts.clone(),
            );
            let result = (scenario.run)(&mut context);
            (result, context.transactions(), context.gas())
        };
        self.record(scenario, name, result, transactions, gas);
    }

    fn record(
        &mut self,
        scenario: &Scenario,
        name: String,
        result: Result<(), ScenarioError>,
        transactions: usize,
        gas: U256,
    ) {
        match result {
            Ok(()) => {
                self.summary
                    .passed(name, Some(scenario.group.to_string()), transactions, gas)
            }
            Err(ScenarioError::Assertion {
                description,
                expected,
                actual,
            }) => self
                .summary
                .failed(name, description, Some(expected), Some(actual)),
            Err(ScenarioError::Chain(error)) => {
                self.summary.failed(name, error.to_string(), None, None)
            }
            Err(ScenarioError::Setup(error)) => self.summary.invalid(name, format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FundMeTester;
    use super::Target;
    use crate::config::ProjectConfig;
    use crate::filters::Filters;
    use crate::gas_reporter::GasReporter;
    use crate::scenario::Group;
    use crate::summary::Summary;
    use crate::NamedAccounts;

    const CONFIG: &str = r#"
default_network: hardhat
named_accounts:
  deployer:
    default: 0
"#;

    fn tester(filters: Filters) -> (FundMeTester, Target) {
        let config = ProjectConfig::parse(CONFIG).expect("Valid config");
        let network = config.network("hardhat", |_| None).expect("Resolved");
        let deployer = network
            .named_signer(&config.named_accounts, NamedAccounts::DEPLOYER)
            .expect("Deployer");
        let target = Target::prepare(&config, &network).expect("Prepared");
        let tester = FundMeTester::new(
            Summary::new(false, true),
            filters,
            GasReporter::new(config.gas_reporter.clone()),
            network,
            deployer,
        );
        (tester, target)
    }

    #[test]
    fn unit_scenarios_pass_in_process() {
        let (mut tester, mut target) = tester(Filters::default());
        tester.run(&mut target);

        assert!(tester.summary.is_successful());
        assert_eq!(
            tester.summary.executed(),
            crate::scenario::unit::scenarios().len()
        );
    }

    #[test]
    fn staging_is_ignored_on_development_networks() {
        let (mut tester, mut target) = tester(Filters::new(vec![], vec![Group::Staging]));
        tester.run(&mut target);

        assert!(tester.summary.is_successful());
        assert_eq!(tester.summary.executed(), 0);
        assert_eq!(tester.summary.elements().len(), 1);
    }

    #[test]
    fn pristine_chain_is_untouched_between_scenarios() {
        let (mut tester, mut target) = tester(Filters::new(vec!["withdraw".to_owned()], vec![]));
        tester.run(&mut target);

        assert!(tester.summary.is_successful());
        match target {
            Target::InProcess(ref chain) => assert_eq!(chain.block_number(), 0),
            Target::Remote { .. } => panic!("Expected the in-process chain"),
        }
    }
}
