//!
//! The fund me tester summary element.
//!

pub mod outcome;

use colored::Colorize;

use self::outcome::passed_variant::PassedVariant;
use self::outcome::Outcome;

///
/// The fund me tester summary element.
///
#[derive(Debug)]
pub struct Element {
    /// The scenario name.
    pub name: String,
    /// The scenario outcome.
    pub outcome: Outcome,
}

impl Element {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(name: String, outcome: Outcome) -> Self {
        Self { name, outcome }
    }

    ///
    /// Prints the element.
    ///
    pub fn print(&self, verbosity: bool) -> Option<String> {
        match self.outcome {
            Outcome::Passed { .. } if !verbosity => return None,
            Outcome::Ignored { .. } if !verbosity => return None,
            _ => {}
        }

        let outcome = match self.outcome {
            Outcome::Passed { .. } => "PASSED".green(),
            Outcome::Failed { .. } => "FAILED".bright_red(),
            Outcome::Invalid { .. } => "INVALID".red(),
            Outcome::Ignored { .. } => "IGNORED".bright_black(),
        };

        let details = match self.outcome {
            Outcome::Passed {
                ref variant,
                ref group,
            } => {
                let mut details = Vec::new();
                if let PassedVariant::Transactions { count, gas } = variant {
                    details.push(format!("transactions {count}").bright_white().to_string());
                    details.push(format!("gas {gas}").bright_white().to_string());
                };
                if let Some(group) = group {
                    details.push(format!("group '{group}'").bright_white().to_string())
                };
                if details.is_empty() {
                    String::new()
                } else {
                    format!("({})", details.join(", "))
                }
            }
            Outcome::Failed {
                ref description,
                ref expected,
                ref actual,
            } => match (expected, actual) {
                (Some(expected), Some(actual)) => {
                    format!("\n {description}\n Expected: {expected}\n Actual:   {actual}")
                }
                _ => format!("\n {description}"),
            },
            Outcome::Invalid { ref error } => format!("\n {error}"),
            Outcome::Ignored { ref reason } => format!("({reason})").bright_black().to_string(),
        };

        Some(format!("{:>7} {} {}", outcome, self.name, details))
    }
}
