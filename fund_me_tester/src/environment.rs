//!
//! The kind of network the tests run on.
//!

///
/// The kind of network the tests run on.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    /// A local development chain: the in-process chain or a local node.
    Development,
    /// A public network with real deployments.
    Live,
}

impl Environment {
    /// The networks treated as development chains.
    pub const DEVELOPMENT_CHAINS: [&'static str; 2] = ["hardhat", "localhost"];

    ///
    /// Classifies a network by its name.
    ///
    pub fn of(network: &str) -> Self {
        if Self::DEVELOPMENT_CHAINS.contains(&network) {
            Self::Development
        } else {
            Self::Live
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Live => write!(f, "live"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;

    #[test]
    fn classifies_networks() {
        assert_eq!(Environment::of("hardhat"), Environment::Development);
        assert_eq!(Environment::of("localhost"), Environment::Development);
        assert_eq!(Environment::of("goerli"), Environment::Live);
        assert_eq!(Environment::of("sepolia"), Environment::Live);
    }

    #[test]
    fn displays_lowercase_names() {
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Live.to_string(), "live");
    }
}
