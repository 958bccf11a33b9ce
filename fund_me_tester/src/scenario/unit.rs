//!
//! The scenarios run against fresh deployments on the in-process network.
//!

use web3::ethabi::Token;
use web3::types::U256;

use crate::chain::development::fund_me::FundMe;
use crate::chain::signer::Signer;

use super::ensure_eq;
use super::ensure_revert;
use super::Group;
use super::Scenario;
use super::ScenarioContext;
use super::ScenarioError;

/// The number of extra funders in the multiple funders scenarios.
pub const EXTRA_FUNDERS: usize = 5;

///
/// One ether, the contribution used throughout.
///
fn send_value() -> U256 {
    U256::exp10(18)
}

///
/// Returns the unit scenarios.
///
pub fn scenarios() -> Vec<Scenario> {
    [
        (
            "constructor sets the aggregator address correctly",
            constructor_sets_price_feed as fn(&mut ScenarioContext<'_>) -> Result<(), ScenarioError>,
        ),
        ("constructor sets the deployer as the owner", constructor_sets_owner),
        ("fund fails if you don't send enough ETH", fund_requires_minimum),
        ("fund updates the amount funded data structure", fund_updates_amounts),
        ("fund adds the funder to the array of funders", fund_adds_funder),
        ("receive routes plain transfers to fund", receive_routes_to_fund),
        ("withdraw ETH from a single funder", withdraw_single_funder),
        ("withdraw allows us to withdraw with multiple funders", withdraw_multiple_funders),
        ("cheaperWithdraw allows us to withdraw with multiple funders", cheaper_withdraw_multiple_funders),
        ("withdraw only allows the owner to withdraw", withdraw_is_owner_only),
    ]
    .into_iter()
    .map(|(name, run)| Scenario {
        name,
        group: Group::Unit,
        run,
    })
    .collect()
}

fn constructor_sets_price_feed(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let expected = context.price_feed()?.address;
    let actual = context.query_address("getPriceFeed", &[])?;
    ensure_eq("price feed address", expected, actual)
}

fn constructor_sets_owner(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let actual = context.query_address("getOwner", &[])?;
    ensure_eq("owner", context.deployer.address(), actual)
}

fn fund_requires_minimum(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let deployer = context.deployer.clone();
    let result = context.send(&deployer, "fund", U256::zero());
    ensure_revert("funding without value", result, FundMe::ERROR_NOT_ENOUGH_ETH)
}

fn fund_updates_amounts(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let deployer = context.deployer.clone();
    context.send(&deployer, "fund", send_value())?;

    let amount = context.query_uint(
        "getAddressToAmountFunded",
        &[Token::Address(deployer.address())],
    )?;
    ensure_eq("amount funded by the deployer", send_value(), amount)
}

fn fund_adds_funder(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let deployer = context.deployer.clone();
    context.send(&deployer, "fund", send_value())?;

    let funder = context.query_address("getFunder", &[Token::Uint(U256::zero())])?;
    ensure_eq("first funder", deployer.address(), funder)
}

fn receive_routes_to_fund(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let funder = context.account(1)?;
    context.transfer(&funder, send_value())?;

    let amount = context.query_uint(
        "getAddressToAmountFunded",
        &[Token::Address(funder.address())],
    )?;
    ensure_eq("amount sent without calldata", send_value(), amount)?;

    let balance = context.balance(context.fund_me.address)?;
    ensure_eq("FundMe balance", send_value(), balance)?;

    let dust = context.transfer(&funder, U256::one());
    ensure_revert("sending dust without calldata", dust, FundMe::ERROR_NOT_ENOUGH_ETH)
}

fn withdraw_single_funder(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let deployer = context.deployer.clone();
    context.send(&deployer, "fund", send_value())?;

    let starting_fund_me = context.balance(context.fund_me.address)?;
    let starting_deployer = context.balance(deployer.address())?;

    let receipt = context.send(&deployer, "withdraw", U256::zero())?;

    let ending_fund_me = context.balance(context.fund_me.address)?;
    let ending_deployer = context.balance(deployer.address())?;

    ensure_eq("FundMe ending balance", U256::zero(), ending_fund_me)?;
    ensure_eq(
        "deployer balance accounting for gas",
        starting_fund_me + starting_deployer,
        ending_deployer + receipt.fee(),
    )
}

fn withdraw_multiple_funders(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    withdraw_from_many(context, "withdraw")
}

fn cheaper_withdraw_multiple_funders(
    context: &mut ScenarioContext<'_>,
) -> Result<(), ScenarioError> {
    withdraw_from_many(context, "cheaperWithdraw")
}

fn withdraw_is_owner_only(context: &mut ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let deployer = context.deployer.clone();
    context.send(&deployer, "fund", send_value())?;

    let attacker = context.account(1)?;
    let result = context.send(&attacker, "withdraw", U256::zero());
    ensure_revert("withdrawal by a non-owner", result, FundMe::ERROR_NOT_OWNER)?;

    let result = context.send(&attacker, "cheaperWithdraw", U256::zero());
    ensure_revert("cheap withdrawal by a non-owner", result, FundMe::ERROR_NOT_OWNER)
}

///
/// Funds from the deployer and the extra funders, withdraws with `method`,
/// and checks that every contribution was reset.
///
fn withdraw_from_many(context: &mut ScenarioContext<'_>, method: &str) -> Result<(), ScenarioError> {
    let deployer = context.deployer.clone();
    context.send(&deployer, "fund", send_value())?;

    let funders = (1..=EXTRA_FUNDERS)
        .map(|index| context.account(index))
        .collect::<Result<Vec<Signer>, ScenarioError>>()?;
    for funder in funders.iter() {
        context.send(funder, "fund", send_value())?;
    }

    let starting_fund_me = context.balance(context.fund_me.address)?;
    let starting_deployer = context.balance(deployer.address())?;
    ensure_eq(
        "FundMe balance before the withdrawal",
        send_value() * U256::from(EXTRA_FUNDERS + 1),
        starting_fund_me,
    )?;

    let receipt = context.send(&deployer, method, U256::zero())?;

    let ending_fund_me = context.balance(context.fund_me.address)?;
    let ending_deployer = context.balance(deployer.address())?;
    ensure_eq("FundMe ending balance", U256::zero(), ending_fund_me)?;
    ensure_eq(
        "deployer balance accounting for gas",
        starting_fund_me + starting_deployer,
        ending_deployer + receipt.fee(),
    )?;

    let first_funder = context.query("getFunder", &[Token::Uint(U256::zero())]);
    ensure_revert("funders reset", first_funder, "")?;

    for funder in std::iter::once(&deployer).chain(funders.iter()) {
        let amount = context.query_uint(
            "getAddressToAmountFunded",
            &[Token::Address(funder.address())],
        )?;
        ensure_eq("amount funded after the withdrawal", U256::zero(), amount)?;
    }

    Ok(())
}
