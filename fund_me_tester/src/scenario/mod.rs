//!
//! The FundMe acceptance scenarios.
//!

pub mod staging;
pub mod unit;

use web3::ethabi::Token;
use web3::types::Address;
use web3::types::U256;

use crate::chain::development::price_feed::MockV3Aggregator;
use crate::chain::development::DevelopmentChain;
use crate::chain::signer::Signer;
use crate::chain::Chain;
use crate::chain::ChainError;
use crate::chain::DeployedContract;
use crate::chain::Receipt;
use crate::gas_reporter::GasReporter;

///
/// The scenario group.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    /// Runs against an existing deployment on a live network.
    Staging,
    /// Runs against fresh deployments on the in-process network.
    Unit,
}

impl std::str::FromStr for Group {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "staging" => Ok(Self::Staging),
            "unit" => Ok(Self::Unit),
            string => anyhow::bail!("Unknown group `{string}`. Supported groups: staging, unit"),
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Staging => write!(f, "staging"),
            Self::Unit => write!(f, "unit"),
        }
    }
}

///
/// The scenario errors.
///
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// An observed value differs from the expected one.
    #[error("{description}: expected {expected}, found {actual}")]
    Assertion {
        description: String,
        expected: String,
        actual: String,
    },
    /// A chain call failed unexpectedly.
    #[error(transparent)]
    Chain(#[from] ChainError),
    /// The scenario could not be prepared.
    #[error(transparent)]
    Setup(#[from] anyhow::Error),
}

///
/// Fails with an assertion error unless `expected == actual`.
///
pub fn ensure_eq<T>(description: &str, expected: T, actual: T) -> Result<(), ScenarioError>
where
    T: PartialEq + std::fmt::Debug,
{
    if expected == actual {
        return Ok(());
    }
    Err(ScenarioError::Assertion {
        description: description.to_owned(),
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    })
}

///
/// Fails unless `result` is a revert whose reason contains `reason`.
///
/// An empty `reason` accepts any revert.
///
pub fn ensure_revert<T>(
    description: &str,
    result: Result<T, ChainError>,
    reason: &str,
) -> Result<(), ScenarioError>
where
    T: std::fmt::Debug,
{
    let expected = if reason.is_empty() {
        "revert".to_owned()
    } else {
        format!("revert with `{reason}`")
    };
    match result {
        Err(ref error) if error.is_revert_with(reason) => Ok(()),
        Err(error) => Err(ScenarioError::Assertion {
            description: description.to_owned(),
            expected,
            actual: error.to_string(),
        }),
        Ok(value) => Err(ScenarioError::Assertion {
            description: description.to_owned(),
            expected,
            actual: format!("success: {value:?}"),
        }),
    }
}

///
/// A single scenario.
///
#[derive(Clone, Copy)]
pub struct Scenario {
    /// The scenario description.
    pub name: &'static str,
    /// The scenario group.
    pub group: Group,
    /// The scenario body.
    pub run: fn(&mut ScenarioContext<'_>) -> Result<(), ScenarioError>,
}

impl Scenario {
    ///
    /// The name shown in the summary and matched by the filters.
    ///
    pub fn full_name(&self) -> String {
        format!("{} :: {}", self.group, self.name)
    }
}

///
/// Returns every scenario, staging first.
///
pub fn all() -> Vec<Scenario> {
    let mut scenarios = staging::scenarios();
    scenarios.extend(unit::scenarios());
    scenarios
}

///
/// The contracts deployed for a unit scenario.
///
#[derive(Debug, Clone)]
pub struct Fixture {
    /// The mock price feed.
    pub price_feed: DeployedContract,
    /// The crowdfunding contract wired to the mock.
    pub fund_me: DeployedContract,
}

impl Fixture {
    ///
    /// Deploys the mock price feed and the crowdfunding contract from `deployer`.
    ///
    pub fn deploy(chain: &mut DevelopmentChain, deployer: &Signer) -> Result<Self, ChainError> {
        let price_feed = chain.deploy_price_feed(
            deployer,
            MockV3Aggregator::DECIMALS,
            MockV3Aggregator::initial_answer(),
        )?;
        let fund_me = chain.deploy_fund_me(deployer, price_feed.address)?;
        Ok(Self {
            price_feed,
            fund_me,
        })
    }
}

///
/// The state a scenario runs with.
///
pub struct ScenarioContext<'a> {
    /// The chain under test.
    chain: &'a mut dyn Chain,
    /// The gas report collector.
    gas_reporter: &'a mut GasReporter,
    /// The crowdfunding contract.
    pub fund_me: DeployedContract,
    /// The mock price feed, known only for fresh deployments.
    pub price_feed: Option<DeployedContract>,
    /// The deployer and owner account.
    pub deployer: Signer,
    /// All accounts of the network, the deployer included.
    pub accounts: Vec<Signer>,
    /// The number of included transactions.
    transactions: usize,
    /// The gas of all included transactions.
    gas: U256,
}

impl<'a> ScenarioContext<'a> {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(
        chain: &'a mut dyn Chain,
        gas_reporter: &'a mut GasReporter,
        fund_me: DeployedContract,
        price_feed: Option<DeployedContract>,
        deployer: Signer,
        accounts: Vec<Signer>,
    ) -> Self {
        Self {
            chain,
            gas_reporter,
            fund_me,
            price_feed,
            deployer,
            accounts,
            transactions: 0,
            gas: U256::zero(),
        }
    }

    ///
    /// Calls a state-changing method of the crowdfunding contract.
    ///
    /// Reverted transactions are not recorded; their fee is visible only in balances.
    ///
    pub fn send(
        &mut self,
        signer: &Signer,
        method: &str,
        value: U256,
    ) -> Result<Receipt, ChainError> {
        let receipt = self
            .chain
            .transact(signer, &self.fund_me, method, &[], value)?;
        self.record(method, &receipt);
        Ok(receipt)
    }

    ///
    /// Sends `value` to the crowdfunding contract without calldata.
    ///
    pub fn transfer(&mut self, signer: &Signer, value: U256) -> Result<Receipt, ChainError> {
        let receipt = self.chain.transfer(signer, self.fund_me.address, value)?;
        self.record("receive", &receipt);
        Ok(receipt)
    }

    ///
    /// Calls a read-only method of the crowdfunding contract.
    ///
    pub fn query(&self, method: &str, args: &[Token]) -> Result<Vec<Token>, ChainError> {
        self.chain.query(&self.fund_me, method, args)
    }

    ///
    /// Calls a read-only method returning a single address.
    ///
    pub fn query_address(&self, method: &str, args: &[Token]) -> Result<Address, ScenarioError> {
        match self.query(method, args)?.as_slice() {
            [Token::Address(address)] => Ok(*address),
            output => {
                Err(anyhow::anyhow!("`{method}` returned {output:?} instead of an address").into())
            }
        }
    }

    ///
    /// Calls a read-only method returning a single unsigned integer.
    ///
    pub fn query_uint(&self, method: &str, args: &[Token]) -> Result<U256, ScenarioError> {
        match self.query(method, args)?.as_slice() {
            [Token::Uint(value)] => Ok(*value),
            output => {
                Err(anyhow::anyhow!("`{method}` returned {output:?} instead of an integer").into())
            }
        }
    }

    ///
    /// The native currency balance of `address`.
    ///
    pub fn balance(&self, address: Address) -> Result<U256, ChainError> {
        self.chain.balance(address)
    }

    ///
    /// The mock price feed of a fresh deployment.
    ///
    pub fn price_feed(&self) -> Result<&DeployedContract, ScenarioError> {
        self.price_feed
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("The price feed mock is not deployed").into())
    }

    ///
    /// The account at `index`.
    ///
    pub fn account(&self, index: usize) -> Result<Signer, ScenarioError> {
        self.accounts.get(index).cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "Account #{index} is not configured: {} accounts available",
                self.accounts.len()
            )
            .into()
        })
    }

    ///
    /// The number of included transactions.
    ///
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    ///
    /// The gas of all included transactions.
    ///
    pub fn gas(&self) -> U256 {
        self.gas
    }

    fn record(&mut self, method: &str, receipt: &Receipt) {
        self.transactions += 1;
        self.gas = self.gas.saturating_add(receipt.gas_used);
        self.gas_reporter
            .record(self.fund_me.name.as_str(), method, receipt);
    }
}
