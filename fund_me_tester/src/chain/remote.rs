//!
//! The JSON-RPC chain.
//!

use std::future::Future;
use std::time::Duration;
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use web3::ethabi::Token;
use web3::transports::Http;
use web3::types::Address;
use web3::types::BlockNumber;
use web3::types::Bytes;
use web3::types::CallRequest;
use web3::types::TransactionParameters;
use web3::types::TransactionReceipt;
use web3::types::H256;
use web3::types::U256;
use web3::types::U64;
use web3::Transport;

use crate::config::network::Endpoint;
use crate::config::network::ResolvedNetwork;
use crate::config::template::Secret;

use super::signer::Signer;
use super::Chain;
use super::ChainError;
use super::DeployedContract;
use super::Receipt;

/// Any URL left in a client error message.
static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:https?|wss?)://[^\s)]+").expect("Always valid"));

///
/// A chain reached over JSON-RPC.
///
/// The tester is synchronous, so a private single-threaded runtime drives the
/// asynchronous client.
///
pub struct RemoteChain<T: Transport = Http> {
    /// The network name.
    name: String,
    /// The endpoint, kept to scrub it from error messages.
    endpoint: Secret,
    /// The runtime driving the client.
    runtime: tokio::runtime::Runtime,
    /// The client.
    web3: web3::Web3<T>,
    /// The configured chain identifier.
    chain_id: u64,
    /// The number of blocks to wait for after inclusion.
    confirmations: usize,
    /// The delay between read-only request attempts.
    retry_delay: Duration,
    /// The receipt polling interval.
    poll_interval: Duration,
    /// How long a submitted transaction may stay unconfirmed.
    confirmation_timeout: Duration,
}

impl RemoteChain<Http> {
    ///
    /// Connects to the network and checks that the node serves the configured chain.
    ///
    pub fn connect(network: &ResolvedNetwork) -> anyhow::Result<Self> {
        let url = match network.endpoint {
            Endpoint::Rpc(ref url) => url,
            Endpoint::InProcess => {
                anyhow::bail!("Network `{}` is not reachable over RPC", network.name)
            }
        };

        let transport = Http::new(url.expose()).map_err(|error| {
            anyhow::anyhow!(
                "Invalid `{}` endpoint: {}",
                network.name,
                redact(error.to_string(), network.name.as_str(), url)
            )
        })?;

        let chain = Self::new(network, transport)?;
        chain.verify_chain_id()?;

        tracing::info!(
            network = %chain.name,
            chain_id = chain.chain_id,
            confirmations = chain.confirmations,
            "connected"
        );
        Ok(chain)
    }
}

impl<T: Transport> RemoteChain<T> {
    /// The number of attempts of a read-only request.
    pub const READ_ATTEMPTS: usize = 3;

    /// The delay between read-only request attempts.
    pub const RETRY_DELAY: Duration = Duration::from_secs(2);

    /// The receipt polling interval.
    pub const POLL_INTERVAL: Duration = Duration::from_secs(4);

    /// How long a submitted transaction may stay unconfirmed.
    pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(600);

    /// The gas limit of a plain value transfer.
    pub const TRANSFER_GAS: u64 = 21_000;

    ///
    /// Wraps `transport` without sending any request.
    ///
    pub fn new(network: &ResolvedNetwork, transport: T) -> anyhow::Result<Self> {
        let endpoint = match network.endpoint {
            Endpoint::Rpc(ref url) => url.clone(),
            Endpoint::InProcess => {
                anyhow::bail!("Network `{}` is not reachable over RPC", network.name)
            }
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            name: network.name.clone(),
            endpoint,
            runtime,
            web3: web3::Web3::new(transport),
            chain_id: network.chain_id,
            confirmations: network.block_confirmations,
            retry_delay: Self::RETRY_DELAY,
            poll_interval: Self::POLL_INTERVAL,
            confirmation_timeout: Self::CONFIRMATION_TIMEOUT,
        })
    }

    ///
    /// Overrides the retry and receipt polling intervals.
    ///
    pub fn with_intervals(mut self, retry_delay: Duration, poll_interval: Duration) -> Self {
        self.retry_delay = retry_delay;
        self.poll_interval = poll_interval;
        self
    }

    ///
    /// Overrides how long a submitted transaction may stay unconfirmed.
    ///
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    ///
    /// Checks that the node serves the configured chain.
    ///
    pub fn verify_chain_id(&self) -> Result<(), ChainError> {
        let actual = self
            .read("eth_chainId", || self.web3.eth().chain_id())?
            .low_u64();
        if actual != self.chain_id {
            return Err(ChainError::ChainIdMismatch {
                expected: self.chain_id,
                actual,
            });
        }
        Ok(())
    }

    ///
    /// Runs a read-only request, retrying on transport failures.
    ///
    fn read<F, R, V>(&self, request: &str, operation: F) -> Result<V, ChainError>
    where
        F: Fn() -> R,
        R: Future<Output = web3::Result<V>>,
    {
        let mut attempt = 1;
        loop {
            match self.runtime.block_on(operation()) {
                Ok(value) => return Ok(value),
                Err(error @ (web3::Error::Transport(_) | web3::Error::Unreachable))
                    if attempt < Self::READ_ATTEMPTS =>
                {
                    let error = self.node_error(error);
                    tracing::warn!(
                        network = %self.name,
                        request,
                        attempt,
                        %error,
                        "request failed, retrying"
                    );
                    attempt += 1;
                    std::thread::sleep(self.retry_delay);
                }
                Err(error) => return Err(self.node_error(error)),
            }
        }
    }

    ///
    /// Estimates, signs and submits a transaction, then waits for its confirmations.
    ///
    /// The nonce and the gas price are fetched up front, so signing never
    /// reaches the node.
    ///
    fn submit(
        &self,
        signer: &Signer,
        to: Address,
        method: &str,
        data: Vec<u8>,
        value: U256,
        gas: Option<U256>,
    ) -> Result<Receipt, ChainError> {
        let from = signer.address();
        let gas = match gas {
            Some(gas) => gas,
            None => {
                let request = CallRequest {
                    from: Some(from),
                    to: Some(to),
                    value: Some(value),
                    data: Some(Bytes(data.clone())),
                    ..Default::default()
                };
                self.runtime
                    .block_on(self.web3.eth().estimate_gas(request, None))
                    .map_err(|error| self.revert_or_node_error(method, error))?
            }
        };
        let nonce = self.read("eth_getTransactionCount", || {
            self.web3
                .eth()
                .transaction_count(from, Some(BlockNumber::Pending))
        })?;
        let gas_price = self.read("eth_gasPrice", || self.web3.eth().gas_price())?;

        let parameters = TransactionParameters {
            nonce: Some(nonce),
            to: Some(to),
            gas,
            gas_price: Some(gas_price),
            value,
            data: Bytes(data),
            chain_id: Some(self.chain_id),
            ..Default::default()
        };
        let signed = self
            .runtime
            .block_on(self.web3.accounts().sign_transaction(parameters, signer.key()))
            .map_err(|error| self.node_error(error))?;

        let hash = self
            .runtime
            .block_on(self.web3.eth().send_raw_transaction(signed.raw_transaction))
            .map_err(|error| self.revert_or_node_error(method, error))?;
        tracing::info!(
            network = %self.name,
            method,
            hash = ?hash,
            "transaction submitted"
        );

        let receipt = self.await_confirmations(hash)?;
        Self::into_receipt(method, receipt)
    }

    ///
    /// Polls for the receipt of `hash` until its block is buried deep enough.
    ///
    fn await_confirmations(&self, hash: H256) -> Result<TransactionReceipt, ChainError> {
        let started = Instant::now();
        loop {
            let receipt = self.read("eth_getTransactionReceipt", || {
                self.web3.eth().transaction_receipt(hash)
            })?;

            if let Some(receipt) = receipt {
                if let Some(included) = receipt.block_number {
                    if self.confirmations <= 1 {
                        return Ok(receipt);
                    }
                    let head = self.read("eth_blockNumber", || self.web3.eth().block_number())?;
                    let depth = head.saturating_sub(included).low_u64() + 1;
                    if depth >= self.confirmations as u64 {
                        return Ok(receipt);
                    }
                }
            }

            if started.elapsed() >= self.confirmation_timeout {
                return Err(ChainError::ConfirmationTimeout { hash });
            }
            std::thread::sleep(self.poll_interval);
        }
    }

    ///
    /// Converts a node receipt, treating a failed status as a revert.
    ///
    fn into_receipt(method: &str, receipt: TransactionReceipt) -> Result<Receipt, ChainError> {
        if receipt.status == Some(U64::zero()) {
            return Err(ChainError::Reverted {
                method: method.to_owned(),
                reason: format!("transaction {:?} failed", receipt.transaction_hash),
            });
        }

        Ok(Receipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.unwrap_or_default().low_u64(),
            gas_used: receipt.gas_used.unwrap_or_default(),
            effective_gas_price: receipt.effective_gas_price.unwrap_or_default(),
        })
    }

    ///
    /// Nodes report would-be reverts as RPC errors.
    ///
    fn revert_or_node_error(&self, method: &str, error: web3::Error) -> ChainError {
        match error {
            web3::Error::Rpc(ref rpc) if rpc.message.contains("revert") => ChainError::Reverted {
                method: method.to_owned(),
                reason: rpc.message.clone(),
            },
            error => self.node_error(error),
        }
    }

    ///
    /// Keeps RPC rejections, and scrubs the endpoint from every other client error.
    ///
    fn node_error(&self, error: web3::Error) -> ChainError {
        match error {
            error @ web3::Error::Rpc(_) => ChainError::Rpc(error),
            error => ChainError::Transport {
                network: self.name.clone(),
                message: redact(error.to_string(), self.name.as_str(), &self.endpoint),
            },
        }
    }
}

///
/// Replaces the endpoint and any other URL in `message`.
///
fn redact(message: String, network: &str, endpoint: &Secret) -> String {
    let message = if endpoint.expose().is_empty() {
        message
    } else {
        message.replace(endpoint.expose(), format!("<{network} endpoint>").as_str())
    };
    URL.replace_all(message.as_str(), "<redacted url>")
        .into_owned()
}

impl<T: Transport> Chain for RemoteChain<T> {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.chain_id)
    }

    fn balance(&self, address: Address) -> Result<U256, ChainError> {
        self.read("eth_getBalance", || self.web3.eth().balance(address, None))
    }

    fn query(
        &self,
        contract: &DeployedContract,
        method: &str,
        args: &[Token],
    ) -> Result<Vec<Token>, ChainError> {
        let function = contract.function(method)?;
        let data = function.encode_input(args)?;
        let request = CallRequest {
            to: Some(contract.address),
            data: Some(Bytes(data)),
            ..Default::default()
        };

        let output = self
            .read("eth_call", || self.web3.eth().call(request.clone(), None))
            .map_err(|error| match error {
                ChainError::Rpc(error) => self.revert_or_node_error(method, error),
                error => error,
            })?;
        Ok(function.decode_output(output.0.as_slice())?)
    }

    fn transact(
        &mut self,
        signer: &Signer,
        contract: &DeployedContract,
        method: &str,
        args: &[Token],
        value: U256,
    ) -> Result<Receipt, ChainError> {
        let data = contract.function(method)?.encode_input(args)?;
        let receipt = self.submit(signer, contract.address, method, data, value, None)?;
        tracing::debug!(
            network = %self.name,
            contract = %contract.name,
            method,
            block = receipt.block_number,
            gas = %receipt.gas_used,
            "transaction confirmed"
        );
        Ok(receipt)
    }

    fn transfer(
        &mut self,
        signer: &Signer,
        to: Address,
        value: U256,
    ) -> Result<Receipt, ChainError> {
        self.submit(
            signer,
            to,
            "transfer",
            vec![],
            value,
            Some(U256::from(Self::TRANSFER_GAS)),
        )
    }
}
