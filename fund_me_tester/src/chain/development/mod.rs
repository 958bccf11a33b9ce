//!
//! The in-process development chain.
//!
//! Contracts are executed natively. Every transaction is mined into its own
//! block, so inclusion is immediate and confirmations are never awaited.
//!

pub mod fund_me;
pub mod price_feed;

use std::collections::HashMap;

use web3::ethabi::StateMutability;
use web3::ethabi::Token;
use web3::signing::keccak256;
use web3::types::Address;
use web3::types::H256;
use web3::types::U256;

use self::fund_me::FundMe;
use self::price_feed::MockV3Aggregator;
use super::signer::Signer;
use super::Chain;
use super::ChainError;
use super::DeployedContract;
use super::Receipt;

///
/// The revert reason of a failed native call.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revert(String);

impl Revert {
    ///
    /// A shortcut constructor.
    ///
    pub fn new<S>(reason: S) -> Self
    where
        S: Into<String>,
    {
        Self(reason.into())
    }

    ///
    /// The revert reason.
    ///
    pub fn reason(&self) -> &str {
        self.0.as_str()
    }
}

///
/// A side effect on balances applied after a successful call.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// No balance changes besides the attached value.
    None,
    /// The contract sends its whole balance to `to`.
    SendBalance { to: Address },
}

///
/// The result of a successful native call.
///
#[derive(Debug, Clone)]
pub struct Execution {
    /// The returned values.
    pub output: Vec<Token>,
    /// The balance side effect.
    pub effect: Effect,
    /// The gas consumed on top of the intrinsic transaction gas.
    pub gas: u64,
}

impl Execution {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(output: Vec<Token>, gas: u64) -> Self {
        Self {
            output,
            effect: Effect::None,
            gas,
        }
    }

    ///
    /// Sets the balance side effect.
    ///
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }
}

///
/// A price feed answer as read by a consumer.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceReading {
    /// The answer as a two's complement `int256`.
    pub answer: U256,
    /// The number of decimals of the answer.
    pub decimals: u8,
}

impl PriceReading {
    ///
    /// The price of one ether in USD with 18 decimals.
    ///
    pub fn to_usd_per_ether(&self) -> Result<U256, Revert> {
        if self.answer.bit(255) || self.answer.is_zero() {
            return Err(Revert::new("the price feed answer is not positive"));
        }
        if self.decimals > 18 {
            return Err(Revert::new("the price feed has more than 18 decimals"));
        }
        self.answer
            .checked_mul(U256::exp10(18 - self.decimals as usize))
            .ok_or_else(|| Revert::new("arithmetic overflow"))
    }
}

///
/// A contract executed natively by the development chain.
///
#[derive(Debug, Clone)]
pub enum NativeContract {
    /// The mock price feed.
    PriceFeed(MockV3Aggregator),
    /// The crowdfunding contract.
    FundMe(FundMe),
}

///
/// The in-process development chain.
///
#[derive(Debug, Clone)]
pub struct DevelopmentChain {
    /// The network name.
    name: String,
    /// The chain identifier.
    chain_id: u64,
    /// The native currency balances.
    balances: HashMap<Address, U256>,
    /// The transaction counts.
    nonces: HashMap<Address, u64>,
    /// The deployed contracts.
    contracts: HashMap<Address, NativeContract>,
    /// The latest block number.
    block_number: u64,
    /// The latest block timestamp.
    timestamp: u64,
    /// The gas price of every transaction.
    gas_price: U256,
}

impl DevelopmentChain {
    /// The initial balance of every development account, in ether.
    pub const INITIAL_BALANCE_ETHER: u64 = 10_000;

    /// The gas price, in gwei.
    pub const GAS_PRICE_GWEI: u64 = 1;

    /// The gas every transaction pays before execution.
    pub const INTRINSIC_GAS: u64 = 21_000;

    /// The gas consumed by a reverted call on top of the intrinsic gas.
    pub const REVERTED_CALL_GAS: u64 = 2_300;

    /// The genesis block timestamp.
    pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

    /// The interval between blocks, in seconds.
    pub const BLOCK_TIME: u64 = 12;

    ///
    /// Creates a chain with every account funded.
    ///
    pub fn new(name: String, chain_id: u64, accounts: &[Signer]) -> Self {
        let initial_balance = U256::from(Self::INITIAL_BALANCE_ETHER) * U256::exp10(18);
        let balances = accounts
            .iter()
            .map(|account| (account.address(), initial_balance))
            .collect();

        Self {
            name,
            chain_id,
            balances,
            nonces: HashMap::new(),
            contracts: HashMap::new(),
            block_number: 0,
            timestamp: Self::GENESIS_TIMESTAMP,
            gas_price: U256::from(Self::GAS_PRICE_GWEI) * U256::exp10(9),
        }
    }

    ///
    /// Deploys a mock price feed.
    ///
    pub fn deploy_price_feed(
        &mut self,
        deployer: &Signer,
        decimals: u8,
        initial_answer: U256,
    ) -> Result<DeployedContract, ChainError> {
        let contract = NativeContract::PriceFeed(MockV3Aggregator::new(
            decimals,
            initial_answer,
            self.timestamp + Self::BLOCK_TIME,
        ));
        let address = self.deploy(deployer, contract, MockV3Aggregator::DEPLOY_GAS)?;
        Ok(DeployedContract::new(
            MockV3Aggregator::NAME.to_owned(),
            address,
            MockV3Aggregator::abi(),
        ))
    }

    ///
    /// Deploys the crowdfunding contract owned by `deployer`.
    ///
    pub fn deploy_fund_me(
        &mut self,
        deployer: &Signer,
        price_feed: Address,
    ) -> Result<DeployedContract, ChainError> {
        let contract = NativeContract::FundMe(FundMe::new(deployer.address(), price_feed));
        let address = self.deploy(deployer, contract, FundMe::DEPLOY_GAS)?;
        Ok(DeployedContract::new(
            FundMe::NAME.to_owned(),
            address,
            FundMe::abi(),
        ))
    }

    ///
    /// Overrides the balance of `address`.
    ///
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        self.balances.insert(address, balance);
    }

    ///
    /// The latest block number.
    ///
    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    ///
    /// Includes a deployment transaction and stores the contract at an address
    /// derived from the deployer and its nonce.
    ///
    fn deploy(
        &mut self,
        deployer: &Signer,
        contract: NativeContract,
        gas: u64,
    ) -> Result<Address, ChainError> {
        let sender = deployer.address();
        let nonce = self.nonce_of(sender);
        let mut preimage = sender.as_bytes().to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let address = Address::from_slice(&keccak256(preimage.as_slice())[12..]);

        let receipt = self.include(sender, U256::zero(), gas)?;
        tracing::debug!(
            network = %self.name,
            address = ?address,
            block = receipt.block_number,
            "deployed a native contract"
        );
        self.contracts.insert(address, contract);
        Ok(address)
    }

    ///
    /// Runs a call against a native contract and includes its transaction.
    ///
    /// The fee is charged even if the call reverts; the value moves only on success.
    ///
    fn execute(
        &mut self,
        signer: &Signer,
        to: Address,
        method: &str,
        args: &[Token],
        value: U256,
        payable: bool,
    ) -> Result<Receipt, ChainError> {
        let sender = signer.address();
        let mut contract = self
            .contracts
            .get(&to)
            .cloned()
            .ok_or(ChainError::UnknownContract { address: to })?;

        let result = if !payable && !value.is_zero() {
            Err(Revert::new(format!("`{method}` is not payable")))
        } else {
            match contract {
                NativeContract::FundMe(ref mut fund_me) => {
                    let price = self.price_reading(fund_me.price_feed());
                    fund_me.execute(sender, value, method, args, price)
                }
                NativeContract::PriceFeed(ref mut feed) => {
                    feed.execute(method, args, self.timestamp + Self::BLOCK_TIME)
                }
            }
        };

        let gas = Self::INTRINSIC_GAS
            + match result {
                Ok(ref execution) => execution.gas,
                Err(_) => Self::REVERTED_CALL_GAS,
            };
        let receipt = self.include(sender, value, gas)?;

        match result {
            Ok(execution) => {
                self.move_value(sender, to, value);
                self.contracts.insert(to, contract);
                if let Effect::SendBalance { to: recipient } = execution.effect {
                    let balance = self.balance_of(to);
                    self.move_value(to, recipient, balance);
                }
                Ok(receipt)
            }
            Err(revert) => Err(ChainError::Reverted {
                method: method.to_owned(),
                reason: revert.0,
            }),
        }
    }

    ///
    /// Reads the latest answer of a price feed.
    ///
    fn price_reading(&self, price_feed: Address) -> Result<PriceReading, Revert> {
        match self.contracts.get(&price_feed) {
            Some(NativeContract::PriceFeed(feed)) => Ok(feed.reading()),
            _ => Err(Revert::new("the price feed is not deployed")),
        }
    }

    ///
    /// Charges the fee, bumps the sender nonce and mines a block.
    ///
    fn include(&mut self, sender: Address, value: U256, gas: u64) -> Result<Receipt, ChainError> {
        let fee = self.gas_price * U256::from(gas);
        let required = value.saturating_add(fee);
        let available = self.balance_of(sender);
        if available < required {
            return Err(ChainError::InsufficientFunds {
                address: sender,
                required,
                available,
            });
        }
        self.balances.insert(sender, available - fee);

        let nonce = self.nonce_of(sender);
        self.nonces.insert(sender, nonce + 1);
        self.block_number += 1;
        self.timestamp += Self::BLOCK_TIME;

        let mut preimage = sender.as_bytes().to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(&self.chain_id.to_be_bytes());

        Ok(Receipt {
            transaction_hash: H256::from(keccak256(preimage.as_slice())),
            block_number: self.block_number,
            gas_used: U256::from(gas),
            effective_gas_price: self.gas_price,
        })
    }

    fn move_value(&mut self, from: Address, to: Address, value: U256) {
        if value.is_zero() || from == to {
            return;
        }
        let from_balance = self.balance_of(from);
        self.balances.insert(from, from_balance - value);
        let to_balance = self.balance_of(to);
        self.balances.insert(to, to_balance + value);
    }

    fn balance_of(&self, address: Address) -> U256 {
        self.balances.get(&address).copied().unwrap_or_default()
    }

    fn nonce_of(&self, address: Address) -> u64 {
        self.nonces.get(&address).copied().unwrap_or_default()
    }
}

impl Chain for DevelopmentChain {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.chain_id)
    }

    fn balance(&self, address: Address) -> Result<U256, ChainError> {
        Ok(self.balance_of(address))
    }

    fn query(
        &self,
        contract: &DeployedContract,
        method: &str,
        args: &[Token],
    ) -> Result<Vec<Token>, ChainError> {
        contract.function(method)?.encode_input(args)?;

        let result = match self.contracts.get(&contract.address) {
            Some(NativeContract::FundMe(fund_me)) => fund_me.query(method, args),
            Some(NativeContract::PriceFeed(feed)) => feed.query(method, args),
            None => {
                return Err(ChainError::UnknownContract {
                    address: contract.address,
                })
            }
        };

        result.map_err(|revert| ChainError::Reverted {
            method: method.to_owned(),
            reason: revert.0,
        })
    }

    fn transact(
        &mut self,
        signer: &Signer,
        contract: &DeployedContract,
        method: &str,
        args: &[Token],
        value: U256,
    ) -> Result<Receipt, ChainError> {
        let function = contract.function(method)?;
        function.encode_input(args)?;
        let payable = function.state_mutability == StateMutability::Payable;

        let receipt = self.execute(signer, contract.address, method, args, value, payable)?;
        tracing::debug!(
            network = %self.name,
            contract = %contract.name,
            method,
            gas = %receipt.gas_used,
            "transaction included"
        );
        Ok(receipt)
    }

    fn transfer(
        &mut self,
        signer: &Signer,
        to: Address,
        value: U256,
    ) -> Result<Receipt, ChainError> {
        if self.contracts.contains_key(&to) {
            return self.execute(signer, to, "receive", &[], value, true);
        }

        let sender = signer.address();
        let receipt = self.include(sender, value, Self::INTRINSIC_GAS)?;
        self.move_value(sender, to, value);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use web3::ethabi::Token;
    use web3::types::Address;
    use web3::types::U256;

    use super::fund_me::FundMe;
    use super::price_feed::MockV3Aggregator;
    use super::DevelopmentChain;
    use crate::chain::signer::Signer;
    use crate::chain::Chain;
    use crate::chain::ChainError;
    use crate::chain::DeployedContract;

    fn ether(amount: u64) -> U256 {
        U256::from(amount) * U256::exp10(18)
    }

    fn deployed() -> (DevelopmentChain, Vec<Signer>, DeployedContract) {
        let accounts = Signer::development_accounts();
        let mut chain = DevelopmentChain::new("hardhat".to_owned(), 31337, accounts.as_slice());
        let price_feed = chain
            .deploy_price_feed(
                &accounts[0],
                MockV3Aggregator::DECIMALS,
                MockV3Aggregator::initial_answer(),
            )
            .expect("Deployed");
        let fund_me = chain
            .deploy_fund_me(&accounts[0], price_feed.address)
            .expect("Deployed");
        (chain, accounts, fund_me)
    }

    #[test]
    fn funds_every_account() {
        let accounts = Signer::development_accounts();
        let chain = DevelopmentChain::new("hardhat".to_owned(), 31337, accounts.as_slice());
        for account in accounts.iter() {
            assert_eq!(chain.balance(account.address()).expect("Balance"), ether(10_000));
        }
    }

    #[test]
    fn deployments_get_distinct_addresses() {
        let (chain, _, fund_me) = deployed();
        let price_feed = chain
            .query(&fund_me, "getPriceFeed", &[])
            .expect("Queried");
        assert_ne!(price_feed[0], Token::Address(fund_me.address));
        assert_eq!(chain.block_number(), 2);
    }

    #[test]
    fn fund_then_withdraw_empties_the_contract() {
        let (mut chain, accounts, fund_me) = deployed();
        chain
            .transact(&accounts[0], &fund_me, "fund", &[], U256::exp10(17) * 5)
            .expect("Funded");
        assert_eq!(chain.balance(fund_me.address).expect("Balance"), U256::exp10(17) * 5);

        chain
            .transact(&accounts[0], &fund_me, "withdraw", &[], U256::zero())
            .expect("Withdrawn");
        assert_eq!(chain.balance(fund_me.address).expect("Balance"), U256::zero());
    }

    #[test]
    fn reverted_calls_still_pay_the_fee() {
        let (mut chain, accounts, fund_me) = deployed();
        let before = chain.balance(accounts[1].address()).expect("Balance");

        let error = chain
            .transact(&accounts[1], &fund_me, "fund", &[], U256::zero())
            .expect_err("Reverted");
        assert!(error.is_revert_with(FundMe::ERROR_NOT_ENOUGH_ETH));

        let after = chain.balance(accounts[1].address()).expect("Balance");
        let fee = U256::from(DevelopmentChain::INTRINSIC_GAS + DevelopmentChain::REVERTED_CALL_GAS)
            * U256::exp10(9);
        assert_eq!(before - after, fee);
    }

    #[test]
    fn rejects_value_on_non_payable_methods() {
        let accounts = Signer::development_accounts();
        let mut chain = DevelopmentChain::new("hardhat".to_owned(), 31337, accounts.as_slice());
        let price_feed = chain
            .deploy_price_feed(&accounts[0], 8, MockV3Aggregator::initial_answer())
            .expect("Deployed");

        let error = chain
            .transact(
                &accounts[0],
                &price_feed,
                "updateAnswer",
                &[Token::Int(U256::from(1))],
                U256::one(),
            )
            .expect_err("Reverted");
        assert!(error.is_revert_with("not payable"));
    }

    #[test]
    fn rejects_unknown_methods() {
        let (mut chain, accounts, fund_me) = deployed();
        assert!(matches!(
            chain.transact(&accounts[0], &fund_me, "rugPull", &[], U256::zero()),
            Err(ChainError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn rejects_mistyped_arguments() {
        let (chain, _, fund_me) = deployed();
        assert!(matches!(
            chain.query(&fund_me, "getFunder", &[Token::Bool(true)]),
            Err(ChainError::Abi(_))
        ));
    }

    #[test]
    fn refuses_transactions_the_sender_cannot_pay_for() {
        let (mut chain, accounts, fund_me) = deployed();
        chain.set_balance(accounts[2].address(), ether(1));
        assert!(matches!(
            chain.transact(&accounts[2], &fund_me, "fund", &[], ether(1)),
            Err(ChainError::InsufficientFunds { .. })
        ));
        assert_eq!(chain.balance(accounts[2].address()).expect("Balance"), ether(1));
    }

    #[test]
    fn transfers_between_accounts() {
        let (mut chain, accounts, _) = deployed();
        let recipient = Address::repeat_byte(0x42);
        let receipt = chain
            .transfer(&accounts[3], recipient, ether(2))
            .expect("Transferred");
        assert_eq!(receipt.gas_used, U256::from(DevelopmentChain::INTRINSIC_GAS));
        assert_eq!(chain.balance(recipient).expect("Balance"), ether(2));
    }
}
