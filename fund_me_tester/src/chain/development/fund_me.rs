//!
//! The crowdfunding contract.
//!

use std::collections::HashMap;

use once_cell::sync::Lazy;
use web3::ethabi;
use web3::ethabi::Token;
use web3::types::Address;
use web3::types::U256;

use super::Effect;
use super::Execution;
use super::PriceReading;
use super::Revert;

/// The contract interface.
static ABI: Lazy<ethabi::Contract> = Lazy::new(|| {
    ethabi::Contract::load(include_str!("abi/FundMe.json").as_bytes()).expect("Always valid")
});

///
/// The crowdfunding contract: anyone funds it above a USD minimum, only the owner withdraws.
///
#[derive(Debug, Clone)]
pub struct FundMe {
    /// The deployer, the only account allowed to withdraw.
    owner: Address,
    /// The ETH/USD price feed.
    price_feed: Address,
    /// The funders in funding order. A repeated funder appears once per contribution.
    funders: Vec<Address>,
    /// The amount contributed by every funder since the last withdrawal.
    address_to_amount_funded: HashMap<Address, U256>,
}

impl FundMe {
    /// The contract name.
    pub const NAME: &'static str = "FundMe";

    /// The revert reason of an insufficient contribution.
    pub const ERROR_NOT_ENOUGH_ETH: &'static str = "You need to spend more ETH!";

    /// The revert reason of a withdrawal by anyone but the owner.
    pub const ERROR_NOT_OWNER: &'static str = "FundMe__NotOwner";

    /// The gas consumed by the deployment.
    pub const DEPLOY_GAS: u64 = 1_054_826;

    /// The gas of a contribution from a first-time funder.
    pub const FUND_FIRST_GAS: u64 = 66_244;

    /// The gas of a contribution from a known funder.
    pub const FUND_REPEAT_GAS: u64 = 31_844;

    /// The fixed gas of a withdrawal.
    pub const WITHDRAW_BASE_GAS: u64 = 14_120;

    /// The per-funder gas of `withdraw`, which reads the funders from storage on every iteration.
    pub const WITHDRAW_PER_FUNDER_GAS: u64 = 7_461;

    /// The per-funder gas of `cheaperWithdraw`, which copies the funders to memory once.
    pub const CHEAPER_WITHDRAW_PER_FUNDER_GAS: u64 = 5_238;

    ///
    /// The minimum contribution in USD with 18 decimals.
    ///
    pub fn minimum_usd() -> U256 {
        U256::from(50) * U256::exp10(18)
    }

    ///
    /// A shortcut constructor.
    ///
    pub fn new(owner: Address, price_feed: Address) -> Self {
        Self {
            owner,
            price_feed,
            funders: vec![],
            address_to_amount_funded: HashMap::new(),
        }
    }

    ///
    /// The contract interface.
    ///
    pub fn abi() -> ethabi::Contract {
        ABI.clone()
    }

    ///
    /// The price feed address.
    ///
    pub fn price_feed(&self) -> Address {
        self.price_feed
    }

    ///
    /// Converts an ether amount into USD with 18 decimals.
    ///
    pub fn conversion_rate(eth_amount: U256, price: &PriceReading) -> Result<U256, Revert> {
        let eth_price = price.to_usd_per_ether()?;
        eth_price
            .checked_mul(eth_amount)
            .map(|usd| usd / U256::exp10(18))
            .ok_or_else(|| Revert::new("arithmetic overflow"))
    }

    ///
    /// Executes a read-only method.
    ///
    pub fn query(&self, method: &str, args: &[Token]) -> Result<Vec<Token>, Revert> {
        match method {
            "MINIMUM_USD" => Ok(vec![Token::Uint(Self::minimum_usd())]),
            "getOwner" => Ok(vec![Token::Address(self.owner)]),
            "getPriceFeed" => Ok(vec![Token::Address(self.price_feed)]),
            "getFunder" => {
                let index = match args.first() {
                    Some(Token::Uint(index)) => *index,
                    _ => return Err(Revert::new("invalid `getFunder` argument")),
                };
                if index >= U256::from(self.funders.len()) {
                    return Err(Revert::new("array index out of bounds"));
                }
                Ok(vec![Token::Address(self.funders[index.as_usize()])])
            }
            "getAddressToAmountFunded" => {
                let funder = match args.first() {
                    Some(Token::Address(funder)) => *funder,
                    _ => return Err(Revert::new("invalid `getAddressToAmountFunded` argument")),
                };
                let amount = self
                    .address_to_amount_funded
                    .get(&funder)
                    .copied()
                    .unwrap_or_default();
                Ok(vec![Token::Uint(amount)])
            }
            method => Err(Revert::new(format!("`{method}` is not a view method"))),
        }
    }

    ///
    /// Executes a state-changing method. A plain value transfer arrives as `receive`.
    ///
    pub fn execute(
        &mut self,
        sender: Address,
        value: U256,
        method: &str,
        args: &[Token],
        price: Result<PriceReading, Revert>,
    ) -> Result<Execution, Revert> {
        match method {
            "fund" | "receive" => self.fund(sender, value, price?),
            "withdraw" => self.withdraw(sender, Self::WITHDRAW_PER_FUNDER_GAS),
            "cheaperWithdraw" => self.withdraw(sender, Self::CHEAPER_WITHDRAW_PER_FUNDER_GAS),
            method => self
                .query(method, args)
                .map(|output| Execution::new(output, 0)),
        }
    }

    ///
    /// Records a contribution worth at least the USD minimum.
    ///
    fn fund(
        &mut self,
        sender: Address,
        value: U256,
        price: PriceReading,
    ) -> Result<Execution, Revert> {
        if Self::conversion_rate(value, &price)? < Self::minimum_usd() {
            return Err(Revert::new(Self::ERROR_NOT_ENOUGH_ETH));
        }

        let amount = self.address_to_amount_funded.entry(sender).or_default();
        let gas = if amount.is_zero() {
            Self::FUND_FIRST_GAS
        } else {
            Self::FUND_REPEAT_GAS
        };
        *amount = amount
            .checked_add(value)
            .ok_or_else(|| Revert::new("arithmetic overflow"))?;
        self.funders.push(sender);

        Ok(Execution::new(vec![], gas))
    }

    ///
    /// Resets every contribution and sends the whole balance to the owner.
    ///
    fn withdraw(&mut self, sender: Address, per_funder_gas: u64) -> Result<Execution, Revert> {
        if sender != self.owner {
            return Err(Revert::new(Self::ERROR_NOT_OWNER));
        }

        let gas = Self::WITHDRAW_BASE_GAS + per_funder_gas * self.funders.len() as u64;
        for funder in self.funders.drain(..) {
            self.address_to_amount_funded.insert(funder, U256::zero());
        }

        Ok(Execution::new(vec![], gas).with_effect(Effect::SendBalance { to: self.owner }))
    }
}

#[cfg(test)]
mod tests {
    use web3::types::Address;
    use web3::types::U256;

    use super::FundMe;
    use crate::chain::development::price_feed::MockV3Aggregator;
    use crate::chain::development::PriceReading;

    fn price() -> PriceReading {
        PriceReading {
            answer: MockV3Aggregator::initial_answer(),
            decimals: MockV3Aggregator::DECIMALS,
        }
    }

    #[test]
    fn converts_ether_to_usd() {
        let usd = FundMe::conversion_rate(U256::exp10(18), &price()).expect("Converted");
        assert_eq!(usd, U256::from(2000) * U256::exp10(18));
    }

    #[test]
    fn accepts_the_exact_minimum() {
        let mut fund_me = FundMe::new(Address::repeat_byte(1), Address::repeat_byte(2));
        let minimum = U256::exp10(18) / 40;
        fund_me
            .execute(Address::repeat_byte(3), minimum, "fund", &[], Ok(price()))
            .expect("Funded");
        assert!(fund_me
            .execute(Address::repeat_byte(3), minimum - 1, "fund", &[], Ok(price()))
            .is_err());
    }

    #[test]
    fn withdraw_is_owner_only() {
        let owner = Address::repeat_byte(1);
        let mut fund_me = FundMe::new(owner, Address::repeat_byte(2));
        let revert = fund_me
            .execute(Address::repeat_byte(3), U256::zero(), "withdraw", &[], Ok(price()))
            .expect_err("Reverted");
        assert_eq!(revert.reason(), FundMe::ERROR_NOT_OWNER);
    }

    #[test]
    fn interface_matches_the_native_methods() {
        let abi = FundMe::abi();
        for method in [
            "fund",
            "withdraw",
            "cheaperWithdraw",
            "getOwner",
            "getFunder",
            "getAddressToAmountFunded",
            "getPriceFeed",
            "MINIMUM_USD",
        ] {
            assert!(abi.function(method).is_ok(), "missing `{method}`");
        }
    }
}
