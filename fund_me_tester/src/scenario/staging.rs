//!
//! The scenarios run against the existing deployment of a live network.
//!

use web3::types::U256;

use crate::units;

use super::ensure_eq;
use super::Group;
use super::Scenario;
use super::ScenarioContext;
use super::ScenarioError;

/// The amount the deployer contributes.
pub const SEND_VALUE: &str = "0.5";

///
/// Returns the staging scenarios.
///
pub fn scenarios() -> Vec<Scenario> {
    vec![Scenario {
        name: "FundMe allows people to fund and withdraw",
        group: Group::Staging,
        run: fund_and_withdraw,
    }]
}

///
/// The deployer funds the contract, withdraws everything, and leaves it empty.
///
pub fn fund_and_withdraw(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let deployer = context.deployer.clone();
    let value = units::parse_ether(SEND_VALUE)?;

    let funded = context.send(&deployer, "fund", value)?;
    tracing::info!(
        transaction = ?funded.transaction_hash,
        block = funded.block_number,
        value = %units::format_ether(value),
        "funded"
    );

    let withdrawn = context.send(&deployer, "withdraw", U256::zero())?;
    tracing::info!(
        transaction = ?withdrawn.transaction_hash,
        block = withdrawn.block_number,
        "withdrawn"
    );

    let ending_balance = context.balance(context.fund_me.address)?;
    ensure_eq("FundMe ending balance", U256::zero(), ending_balance)
}

#[cfg(test)]
mod tests {
    use crate::chain::development::DevelopmentChain;
    use crate::chain::signer::Signer;
    use crate::chain::Chain;
    use crate::config::reporting::GasReporterConfig;
    use crate::gas_reporter::GasReporter;
    use crate::scenario::Fixture;
    use crate::scenario::ScenarioContext;
    use crate::scenario::ScenarioError;

    #[test]
    fn leaves_the_contract_empty() {
        let accounts = Signer::development_accounts();
        let deployer = accounts[0].clone();
        let mut chain = DevelopmentChain::new("hardhat".to_owned(), 31337, accounts.as_slice());
        let fixture = Fixture::deploy(&mut chain, &deployer).expect("Deployed");
        let mut reporter = GasReporter::new(GasReporterConfig::default());

        let mut context = ScenarioContext::new(
            &mut chain,
            &mut reporter,
            fixture.fund_me.clone(),
            None,
            deployer,
            accounts,
        );
        super::fund_and_withdraw(&mut context).expect("Passed");
        assert_eq!(context.transactions(), 2);
        drop(context);

        assert!(chain
            .balance(fixture.fund_me.address)
            .expect("Balance")
            .is_zero());
    }

    #[test]
    fn fails_when_the_deployer_is_not_the_owner() {
        let accounts = Signer::development_accounts();
        let mut chain = DevelopmentChain::new("hardhat".to_owned(), 31337, accounts.as_slice());
        let fixture = Fixture::deploy(&mut chain, &accounts[0]).expect("Deployed");
        let mut reporter = GasReporter::new(GasReporterConfig::default());

        let mut context = ScenarioContext::new(
            &mut chain,
            &mut reporter,
            fixture.fund_me,
            None,
            accounts[1].clone(),
            accounts.clone(),
        );
        let error = super::fund_and_withdraw(&mut context).expect_err("Not the owner");
        assert!(matches!(error, ScenarioError::Chain(ref error) if error.is_revert_with("FundMe__NotOwner")));
    }
}
