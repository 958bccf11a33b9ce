//!
//! The fund me tester summary element outcome.
//!

pub mod passed_variant;

use self::passed_variant::PassedVariant;

///
/// The fund me tester summary element outcome.
///
#[derive(Debug)]
pub enum Outcome {
    /// The `passed` outcome.
    Passed {
        /// The outcome variant.
        variant: PassedVariant,
        /// The scenario group name.
        group: Option<String>,
    },
    /// The `failed` outcome. The contract behaved unexpectedly or a call failed.
    Failed {
        /// What was checked, or the call error.
        description: String,
        /// The expected value.
        expected: Option<String>,
        /// The actual value.
        actual: Option<String>,
    },
    /// The `invalid` outcome. The scenario could not be set up.
    Invalid {
        /// The setup error description.
        error: String,
    },
    /// The `ignored` outcome. The scenario does not apply to the network.
    Ignored {
        /// Why the scenario was skipped.
        reason: String,
    },
}

impl Outcome {
    ///
    /// A shortcut constructor.
    ///
    pub fn passed(group: Option<String>, variant: PassedVariant) -> Self {
        Self::Passed { group, variant }
    }

    ///
    /// A shortcut constructor.
    ///
    pub fn failed(description: String, expected: Option<String>, actual: Option<String>) -> Self {
        Self::Failed {
            description,
            expected,
            actual,
        }
    }

    ///
    /// A shortcut constructor.
    ///
    pub fn invalid<S>(error: S) -> Self
    where
        S: ToString,
    {
        Self::Invalid {
            error: error.to_string(),
        }
    }

    ///
    /// A shortcut constructor.
    ///
    pub fn ignored<S>(reason: S) -> Self
    where
        S: ToString,
    {
        Self::Ignored {
            reason: reason.to_string(),
        }
    }
}
