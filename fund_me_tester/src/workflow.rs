//!
//! The fund me tester workflow.
//!

///
/// The fund me tester workflow.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    /// Validates the project and the network without sending transactions.
    Check,
    /// Runs the scenarios.
    Run,
}

impl std::str::FromStr for Workflow {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "check" => Ok(Self::Check),
            "run" => Ok(Self::Run),
            string => anyhow::bail!(
                "Unknown workflow `{string}`. Supported workflows: check, run"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Workflow;

    #[test]
    fn parses_known_workflows() {
        assert_eq!("check".parse::<Workflow>().expect("Parsed"), Workflow::Check);
        assert_eq!("run".parse::<Workflow>().expect("Parsed"), Workflow::Run);
        assert!("deploy".parse::<Workflow>().is_err());
    }
}
