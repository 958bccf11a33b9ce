//!
//! The configuration errors.
//!

///
/// The configuration errors.
///
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A referenced environment variable is unset or empty.
    #[error("Environment variable `{variable}` is required but not set")]
    MissingVariable { variable: String },
    /// A value contains an unterminated `${` reference.
    #[error("Malformed environment reference in `{template}`")]
    MalformedTemplate { template: String },
    /// The network is not configured.
    #[error("Unknown network `{name}`. Available networks: {available}")]
    UnknownNetwork { name: String, available: String },
    /// A non-built-in network has no endpoint.
    #[error("Network `{network}` has no `url`")]
    MissingUrl { network: String },
    /// A signing key is not a 32-byte hex string.
    #[error("Network `{network}` account #{index} is not a valid private key: {reason}")]
    InvalidPrivateKey {
        network: String,
        index: usize,
        reason: String,
    },
    /// The role is not present in `named_accounts`.
    #[error("Unknown named account `{role}`")]
    UnknownNamedAccount { role: String },
    /// The role has neither a network-specific nor a default index.
    #[error("Named account `{role}` has no index for network `{network}`")]
    NoIndexForNetwork { role: String, network: String },
    /// The role's index points past the configured accounts.
    #[error("Named account `{role}` refers to account #{index}, but network `{network}` has {available} account(s)")]
    AccountIndexOutOfRange {
        role: String,
        network: String,
        index: usize,
        available: usize,
    },
}
