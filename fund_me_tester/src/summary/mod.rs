//!
//! The fund me tester summary.
//!

pub mod element;

use colored::Colorize;

use self::element::outcome::passed_variant::PassedVariant;
use self::element::outcome::Outcome;
use self::element::Element;

///
/// The fund me tester summary.
///
#[derive(Debug)]
pub struct Summary {
    /// The summary elements.
    elements: Vec<Element>,
    /// The output verbosity.
    verbosity: bool,
    /// Whether the output is suppressed.
    quiet: bool,
    /// The passed scenarios counter.
    passed: usize,
    /// The failed scenarios counter.
    failed: usize,
    /// The invalid scenarios counter.
    invalid: usize,
    /// The ignored scenarios counter.
    ignored: usize,
}

impl Summary {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(verbosity: bool, quiet: bool) -> Self {
        Self {
            elements: Vec::new(),
            verbosity,
            quiet,
            passed: 0,
            failed: 0,
            invalid: 0,
            ignored: 0,
        }
    }

    ///
    /// Whether the run has been successful.
    ///
    pub fn is_successful(&self) -> bool {
        for element in self.elements.iter() {
            match element.outcome {
                Outcome::Passed { .. } => continue,
                Outcome::Failed { .. } => return false,
                Outcome::Invalid { .. } => return false,
                Outcome::Ignored { .. } => continue,
            }
        }

        true
    }

    ///
    /// The number of scenarios that were executed.
    ///
    pub fn executed(&self) -> usize {
        self.passed + self.failed + self.invalid
    }

    ///
    /// The recorded elements.
    ///
    pub fn elements(&self) -> &[Element] {
        self.elements.as_slice()
    }

    ///
    /// Adds a passed outcome.
    ///
    pub fn passed(
        &mut self,
        name: String,
        group: Option<String>,
        transactions: usize,
        gas: web3::types::U256,
    ) {
        let variant = PassedVariant::new(transactions, gas);
        self.push_element(Element::new(name, Outcome::passed(group, variant)));
    }

    ///
    /// Adds a failed outcome.
    ///
    pub fn failed(
        &mut self,
        name: String,
        description: String,
        expected: Option<String>,
        actual: Option<String>,
    ) {
        let element = Element::new(name, Outcome::failed(description, expected, actual));
        self.push_element(element);
    }

    ///
    /// Adds an invalid outcome.
    ///
    pub fn invalid<S>(&mut self, name: String, error: S)
    where
        S: ToString,
    {
        self.push_element(Element::new(name, Outcome::invalid(error)));
    }

    ///
    /// Adds an ignored outcome.
    ///
    pub fn ignored<S>(&mut self, name: String, reason: S)
    where
        S: ToString,
    {
        self.push_element(Element::new(name, Outcome::ignored(reason)));
    }

    ///
    /// Pushes an element to the summary, printing it.
    ///
    fn push_element(&mut self, element: Element) {
        if !self.quiet {
            if let Some(string) = element.print(self.verbosity) {
                println!("{string}");
            }
        }

        match element.outcome {
            Outcome::Passed { .. } => self.passed += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Invalid { .. } => self.invalid += 1,
            Outcome::Ignored { .. } => self.ignored += 1,
        }

        self.elements.push(element);
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.quiet {
            return Ok(());
        }

        writeln!(
            f,
            "╔══════════════════════╡ FUND ME TESTING ╞═════════════════════╗"
        )?;
        writeln!(
            f,
            "║                                                              ║"
        )?;
        writeln!(
            f,
            "║     {:7}                                   {:10}     ║",
            "PASSED".green(),
            self.passed.to_string().green(),
        )?;
        writeln!(
            f,
            "║     {:7}                                   {:10}     ║",
            "FAILED".bright_red(),
            self.failed.to_string().bright_red(),
        )?;
        writeln!(
            f,
            "║     {:7}                                   {:10}     ║",
            "INVALID".red(),
            self.invalid.to_string().red(),
        )?;
        writeln!(
            f,
            "║     {:7}                                   {:10}     ║",
            "IGNORED".bright_black(),
            self.ignored.to_string().bright_black(),
        )?;
        writeln!(
            f,
            "║               {:10} SCENARIOS EXECUTED                  ║",
            self.executed(),
        )?;
        writeln!(
            f,
            "╚══════════════════════════════════════════════════════════════╝"
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use web3::types::U256;

    use super::Summary;

    #[test]
    fn ignored_scenarios_keep_the_run_successful() {
        let mut summary = Summary::new(false, true);
        summary.passed("unit :: fund".to_owned(), None, 1, U256::from(87_000));
        summary.ignored("staging :: fund".to_owned(), "development network");
        assert!(summary.is_successful());
        assert_eq!(summary.executed(), 1);
    }

    #[test]
    fn failures_and_invalid_setups_fail_the_run() {
        let mut failed = Summary::new(false, true);
        failed.failed(
            "unit :: withdraw".to_owned(),
            "FundMe balance".to_owned(),
            Some("0".to_owned()),
            Some("1".to_owned()),
        );
        assert!(!failed.is_successful());

        let mut invalid = Summary::new(false, true);
        invalid.invalid("unit :: withdraw".to_owned(), "deployment failed");
        assert!(!invalid.is_successful());
    }
}
