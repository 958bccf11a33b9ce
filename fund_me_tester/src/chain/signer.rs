//!
//! The transaction signer.
//!

use web3::signing::Key;
use web3::signing::SecretKey;
use web3::signing::SecretKeyRef;
use web3::types::Address;

///
/// A signing identity: a private key and the address derived from it.
///
#[derive(Clone)]
pub struct Signer {
    /// The derived address.
    address: Address,
    /// The private key.
    key: SecretKey,
}

impl Signer {
    /// The well-known development chain private keys, funded on every development chain.
    pub const DEVELOPMENT_KEYS: [&'static str; 10] = [
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
        "7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6",
        "47e179ec197488593b187f80a00eb0da91f1b9d0b13f8733639f19c30a34926a",
        "8b3a350cf5c34c9194ca85829a2df0ec3153be0318b5e2d3348e872092edffba",
        "92db14e403b83dfe3df233f83dfa3a0d7096f21ca9b0d6d6b8d88b2b4ec1564e",
        "4bbbf85ce3377467afe5d46f804f221813b2bb87f24d81f60f1fcdbf7cbf4356",
        "dbda1821b80551c9d65939329250298aa3472ba22feea921c0cf5d620ea67b97",
        "2a871d0798f97d79848a013d4936a73bf4cc922c825d33c1cf7073dff6d409c6",
    ];

    ///
    /// Parses a hex-encoded private key, with or without the `0x` prefix.
    ///
    pub fn from_hex(value: &str) -> anyhow::Result<Self> {
        let value = value.trim();
        let value = value.strip_prefix("0x").unwrap_or(value);
        if value.len() != 64 {
            anyhow::bail!("expected 64 hex digits, found {}", value.len());
        }

        let bytes = hex::decode(value).map_err(|error| anyhow::anyhow!("{error}"))?;
        let key = SecretKey::from_slice(bytes.as_slice())
            .map_err(|error| anyhow::anyhow!("{error}"))?;
        Ok(Self::new(key))
    }

    ///
    /// A shortcut constructor.
    ///
    pub fn new(key: SecretKey) -> Self {
        let address = SecretKeyRef::new(&key).address();
        Self { address, key }
    }

    ///
    /// Returns the well-known development accounts.
    ///
    pub fn development_accounts() -> Vec<Self> {
        Self::DEVELOPMENT_KEYS
            .iter()
            .map(|key| Self::from_hex(key).expect("Always valid"))
            .collect()
    }

    ///
    /// The signer address.
    ///
    pub fn address(&self) -> Address {
        self.address
    }

    ///
    /// The signer private key.
    ///
    pub fn key(&self) -> &SecretKey {
        &self.key
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Signer {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Signer {}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::Signer;

    #[test]
    fn derives_the_first_development_address() {
        let signer = Signer::from_hex(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .expect("Valid key");
        let expected: web3::types::Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
            .parse()
            .expect("Valid address");
        assert_eq!(signer.address(), expected);
    }

    #[test]
    fn development_accounts_are_distinct() {
        let accounts = Signer::development_accounts();
        let addresses: HashSet<_> = accounts.iter().map(Signer::address).collect();
        assert_eq!(addresses.len(), Signer::DEVELOPMENT_KEYS.len());
    }

    #[test]
    fn rejects_placeholder_keys() {
        assert!(Signer::from_hex("0xkey").is_err());
        assert!(Signer::from_hex("key").is_err());
        assert!(Signer::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn never_prints_the_key() {
        let signer = Signer::development_accounts().remove(0);
        let printed = format!("{signer:?}");
        assert!(!printed.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478"));
    }
}
