//!
//! The blockchain access layer.
//!

pub mod development;
pub mod remote;
pub mod signer;

use web3::ethabi;
use web3::ethabi::Token;
use web3::types::Address;
use web3::types::H256;
use web3::types::U256;

use self::signer::Signer;

///
/// A contract instance known to the tester: its address and interface.
///
#[derive(Debug, Clone)]
pub struct DeployedContract {
    /// The contract name, e.g. `FundMe`.
    pub name: String,
    /// The contract address.
    pub address: Address,
    /// The contract interface.
    pub abi: ethabi::Contract,
}

impl DeployedContract {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(name: String, address: Address, abi: ethabi::Contract) -> Self {
        Self { name, address, abi }
    }

    ///
    /// Returns the interface of `method`.
    ///
    pub fn function(&self, method: &str) -> Result<&ethabi::Function, ChainError> {
        self.abi
            .function(method)
            .map_err(|_| ChainError::UnknownMethod {
                contract: self.name.clone(),
                method: method.to_owned(),
            })
    }
}

///
/// The result of an included transaction.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The transaction hash.
    pub transaction_hash: H256,
    /// The including block.
    pub block_number: u64,
    /// The gas consumed.
    pub gas_used: U256,
    /// The price paid per unit of gas.
    pub effective_gas_price: U256,
}

impl Receipt {
    ///
    /// The total fee paid by the sender.
    ///
    pub fn fee(&self) -> U256 {
        self.gas_used.saturating_mul(self.effective_gas_price)
    }
}

///
/// The chain access errors.
///
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The transaction was included but reverted, or would revert.
    #[error("`{method}` reverted: {reason}")]
    Reverted { method: String, reason: String },
    /// The sender cannot pay for the value and the fee.
    #[error("Insufficient funds on {address:?}: {required} wei required, {available} wei available")]
    InsufficientFunds {
        address: Address,
        required: U256,
        available: U256,
    },
    /// The method is not part of the contract interface.
    #[error("Contract `{contract}` has no method `{method}`")]
    UnknownMethod { contract: String, method: String },
    /// No contract is deployed at the address.
    #[error("No contract is deployed at {address:?}")]
    UnknownContract { address: Address },
    /// The node serves another chain than configured.
    #[error("Chain identifier mismatch: configured {expected}, the node reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },
    /// The arguments or the return data do not match the interface.
    #[error("ABI error: {0}")]
    Abi(#[from] ethabi::Error),
    /// The node rejected the request.
    #[error("{0}")]
    Rpc(web3::Error),
    /// The node could not be reached. The message never carries the endpoint.
    #[error("Transport error on `{network}`: {message}")]
    Transport { network: String, message: String },
    /// The transaction was not confirmed in time.
    #[error("Transaction {hash:?} was not confirmed in time")]
    ConfirmationTimeout { hash: H256 },
}

impl ChainError {
    ///
    /// Whether the error is a revert whose reason contains `fragment`.
    ///
    pub fn is_revert_with(&self, fragment: &str) -> bool {
        matches!(self, Self::Reverted { reason, .. } if reason.contains(fragment))
    }
}

///
/// A blockchain the scenarios run against.
///
/// Every state-changing call returns only after its transaction is included
/// with the network's confirmation depth.
///
pub trait Chain {
    ///
    /// The network name.
    ///
    fn name(&self) -> &str;

    ///
    /// The chain identifier.
    ///
    fn chain_id(&self) -> Result<u64, ChainError>;

    ///
    /// The native currency balance of `address`.
    ///
    fn balance(&self, address: Address) -> Result<U256, ChainError>;

    ///
    /// Calls a read-only contract method.
    ///
    fn query(
        &self,
        contract: &DeployedContract,
        method: &str,
        args: &[Token],
    ) -> Result<Vec<Token>, ChainError>;

    ///
    /// Sends a state-changing contract call with `value` attached.
    ///
    fn transact(
        &mut self,
        signer: &Signer,
        contract: &DeployedContract,
        method: &str,
        args: &[Token],
        value: U256,
    ) -> Result<Receipt, ChainError>;

    ///
    /// Sends `value` to `to` without calldata.
    ///
    fn transfer(&mut self, signer: &Signer, to: Address, value: U256)
        -> Result<Receipt, ChainError>;
}
