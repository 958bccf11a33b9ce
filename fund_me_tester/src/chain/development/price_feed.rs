//!
//! The mock price feed aggregator.
//!

use once_cell::sync::Lazy;
use web3::ethabi;
use web3::ethabi::Token;
use web3::types::U256;

use super::Execution;
use super::PriceReading;
use super::Revert;

/// The aggregator interface.
static ABI: Lazy<ethabi::Contract> = Lazy::new(|| {
    ethabi::Contract::load(include_str!("abi/MockV3Aggregator.json").as_bytes())
        .expect("Always valid")
});

///
/// A price feed whose answer is set by hand, standing in for a real oracle.
///
#[derive(Debug, Clone)]
pub struct MockV3Aggregator {
    /// The number of decimals of the answer.
    decimals: u8,
    /// The latest answer as a two's complement `int256`.
    latest_answer: U256,
    /// The latest answer timestamp.
    latest_timestamp: U256,
    /// The latest round identifier.
    latest_round: U256,
}

impl MockV3Aggregator {
    /// The contract name.
    pub const NAME: &'static str = "MockV3Aggregator";

    /// The default number of decimals.
    pub const DECIMALS: u8 = 8;

    /// The gas consumed by the deployment.
    pub const DEPLOY_GAS: u64 = 569_635;

    /// The gas consumed by `updateAnswer`.
    pub const UPDATE_ANSWER_GAS: u64 = 64_000;

    ///
    /// The default answer: 2000 USD per ether with 8 decimals.
    ///
    pub fn initial_answer() -> U256 {
        U256::from(2000) * U256::exp10(Self::DECIMALS as usize)
    }

    ///
    /// A shortcut constructor.
    ///
    pub fn new(decimals: u8, initial_answer: U256, timestamp: u64) -> Self {
        Self {
            decimals,
            latest_answer: initial_answer,
            latest_timestamp: U256::from(timestamp),
            latest_round: U256::one(),
        }
    }

    ///
    /// The contract interface.
    ///
    pub fn abi() -> ethabi::Contract {
        ABI.clone()
    }

    ///
    /// The latest answer as seen by a consumer.
    ///
    pub fn reading(&self) -> PriceReading {
        PriceReading {
            answer: self.latest_answer,
            decimals: self.decimals,
        }
    }

    ///
    /// Executes a read-only method.
    ///
    pub fn query(&self, method: &str, _args: &[Token]) -> Result<Vec<Token>, Revert> {
        match method {
            "decimals" => Ok(vec![Token::Uint(U256::from(self.decimals))]),
            "latestAnswer" => Ok(vec![Token::Int(self.latest_answer)]),
            "latestRoundData" => Ok(vec![
                Token::Uint(self.latest_round),
                Token::Int(self.latest_answer),
                Token::Uint(self.latest_timestamp),
                Token::Uint(self.latest_timestamp),
                Token::Uint(self.latest_round),
            ]),
            method => Err(Revert::new(format!("`{method}` is not a view method"))),
        }
    }

    ///
    /// Executes a state-changing method.
    ///
    pub fn execute(
        &mut self,
        method: &str,
        args: &[Token],
        timestamp: u64,
    ) -> Result<Execution, Revert> {
        match method {
            "updateAnswer" => {
                let answer = match args.first() {
                    Some(Token::Int(answer)) => *answer,
                    _ => return Err(Revert::new("invalid `updateAnswer` argument")),
                };
                self.latest_answer = answer;
                self.latest_timestamp = U256::from(timestamp);
                self.latest_round += U256::one();
                Ok(Execution::new(vec![], Self::UPDATE_ANSWER_GAS))
            }
            "receive" => Err(Revert::new("the contract cannot receive value")),
            method => self
                .query(method, args)
                .map(|output| Execution::new(output, 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use web3::ethabi::Token;
    use web3::types::U256;

    use super::MockV3Aggregator;

    #[test]
    fn reports_latest_round() {
        let mut feed = MockV3Aggregator::new(8, MockV3Aggregator::initial_answer(), 100);
        feed.execute("updateAnswer", &[Token::Int(U256::from(3000) * U256::exp10(8))], 112)
            .expect("Updated");

        let round = feed.query("latestRoundData", &[]).expect("Queried");
        assert_eq!(round[0], Token::Uint(U256::from(2)));
        assert_eq!(round[1], Token::Int(U256::from(300_000_000_000u64)));
        assert_eq!(round[3], Token::Uint(U256::from(112)));
    }

    #[test]
    fn interface_matches_the_native_methods() {
        let abi = MockV3Aggregator::abi();
        for method in ["decimals", "latestAnswer", "latestRoundData", "updateAnswer"] {
            assert!(abi.function(method).is_ok(), "missing `{method}`");
        }
    }
}
