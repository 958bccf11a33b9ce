//!
//! The fund me tester summary element passed outcome variant.
//!

///
/// The fund me tester summary element passed outcome variant.
///
#[derive(Debug)]
pub enum PassedVariant {
    /// The scenario sent transactions.
    Transactions {
        /// The number of included transactions.
        count: usize,
        /// The total gas used.
        gas: web3::types::U256,
    },
    /// The scenario only read the chain.
    ReadOnly,
}

impl PassedVariant {
    ///
    /// Chooses the variant by the number of sent transactions.
    ///
    pub fn new(count: usize, gas: web3::types::U256) -> Self {
        if count == 0 {
            Self::ReadOnly
        } else {
            Self::Transactions { count, gas }
        }
    }
}
