//!
//! The block explorer integration.
//!

use std::time::Duration;

use anyhow::Context;
use web3::types::Address;

use crate::config::template::Secret;

///
/// An Etherscan-compatible block explorer.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explorer {
    /// The website base URL.
    pub site: &'static str,
    /// The API base URL.
    pub api: &'static str,
}

///
/// The `getsourcecode` API response.
///
#[derive(Debug, serde::Deserialize)]
struct SourceCodeResponse {
    status: String,
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

impl Explorer {
    /// The API request timeout.
    pub const TIMEOUT: Duration = Duration::from_secs(30);

    ///
    /// Returns the explorer of a known public chain.
    ///
    pub fn for_chain(chain_id: u64) -> Option<Self> {
        match chain_id {
            1 => Some(Self {
                site: "https://etherscan.io",
                api: "https://api.etherscan.io/api",
            }),
            5 => Some(Self {
                site: "https://goerli.etherscan.io",
                api: "https://api-goerli.etherscan.io/api",
            }),
            11155111 => Some(Self {
                site: "https://sepolia.etherscan.io",
                api: "https://api-sepolia.etherscan.io/api",
            }),
            _ => None,
        }
    }

    ///
    /// The explorer page of `address`.
    ///
    pub fn address_url(&self, address: Address) -> String {
        format!("{}/address/{address:?}", self.site)
    }

    ///
    /// Asks the explorer whether the source of the contract at `address` is verified.
    ///
    pub fn is_verified(&self, address: Address, api_key: &Secret) -> anyhow::Result<bool> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()?;
        let address = format!("{address:?}");
        let response: SourceCodeResponse = client
            .get(self.api)
            .query(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address.as_str()),
                ("apikey", api_key.expose()),
            ])
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Explorer request to `{}` failed", self.api))?
            .json()
            .map_err(reqwest::Error::without_url)
            .context("Invalid explorer response")?;

        Self::parse_verification(response)
    }

    ///
    /// A verified contract has a non-empty `SourceCode` in the first result entry.
    ///
    fn parse_verification(response: SourceCodeResponse) -> anyhow::Result<bool> {
        if response.status != "1" {
            anyhow::bail!(
                "Explorer error: {} ({})",
                response.message,
                response.result.as_str().unwrap_or_default()
            );
        }

        Ok(response
            .result
            .get(0)
            .and_then(|entry| entry.get("SourceCode"))
            .and_then(serde_json::Value::as_str)
            .map(|source| !source.is_empty())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use web3::types::Address;

    use super::Explorer;
    use super::SourceCodeResponse;
    use crate::config::template::Template;

    fn response(json: serde_json::Value) -> SourceCodeResponse {
        serde_json::from_value(json).expect("Valid response")
    }

    #[test]
    fn knows_public_chains() {
        assert!(Explorer::for_chain(1).is_some());
        assert!(Explorer::for_chain(5).is_some());
        assert!(Explorer::for_chain(31337).is_none());
    }

    #[test]
    fn builds_address_urls() {
        let explorer = Explorer::for_chain(5).expect("Known chain");
        let url = explorer.address_url(Address::repeat_byte(0xab));
        assert_eq!(
            url,
            format!("https://goerli.etherscan.io/address/0x{}", "ab".repeat(20))
        );
    }

    #[test]
    fn detects_verified_source() {
        let verified = response(serde_json::json!({
            "status": "1",
            "message": "OK",
            "result": [{ "SourceCode": "pragma solidity ^0.8.8; contract FundMe {}" }]
        }));
        assert!(Explorer::parse_verification(verified).expect("Parsed"));

        let unverified = response(serde_json::json!({
            "status": "1",
            "message": "OK",
            "result": [{ "SourceCode": "" }]
        }));
        assert!(!Explorer::parse_verification(unverified).expect("Parsed"));
    }

    #[test]
    fn reports_api_errors() {
        let error = response(serde_json::json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Invalid API Key"
        }));
        let message = Explorer::parse_verification(error)
            .expect_err("Failed")
            .to_string();
        assert!(message.contains("Invalid API Key"));
    }

    #[test]
    fn request_failures_hide_the_api_key() {
        let explorer = Explorer {
            site: "http://127.0.0.1:1",
            api: "http://127.0.0.1:1/api",
        };
        let api_key = Template::new("ETHERSCANSECRET")
            .resolve(|_| None)
            .expect("Resolved");

        let error = explorer
            .is_verified(Address::repeat_byte(0xab), &api_key)
            .expect_err("Nothing listens");
        let message = format!("{error:#}");
        assert!(!message.contains("ETHERSCANSECRET"), "{message}");
        assert!(message.contains("http://127.0.0.1:1/api"), "{message}");
    }
}
