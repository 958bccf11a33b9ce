//!
//! The gas usage report.
//!

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use web3::types::U256;

use crate::chain::Receipt;
use crate::config::reporting::GasReporterConfig;
use crate::units;

///
/// The gas usage of one contract method.
///
#[derive(Debug, Clone)]
pub struct MethodGas {
    /// The number of included calls.
    pub calls: usize,
    /// The cheapest call.
    pub min: U256,
    /// The most expensive call.
    pub max: U256,
    /// The total gas of all calls.
    pub total: U256,
    /// The total fee of all calls, in wei.
    pub total_fee: U256,
}

impl MethodGas {
    ///
    /// The average gas per call.
    ///
    pub fn average(&self) -> U256 {
        self.total / U256::from(self.calls.max(1))
    }

    ///
    /// The average fee per call, in wei.
    ///
    pub fn average_fee(&self) -> U256 {
        self.total_fee / U256::from(self.calls.max(1))
    }
}

///
/// Collects the gas of every included transaction per contract method.
///
#[derive(Debug)]
pub struct GasReporter {
    /// The reporting options.
    config: GasReporterConfig,
    /// The gas per `(contract, method)`.
    methods: BTreeMap<(String, String), MethodGas>,
}

impl GasReporter {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(config: GasReporterConfig) -> Self {
        Self {
            config,
            methods: BTreeMap::new(),
        }
    }

    ///
    /// Whether the report is produced.
    ///
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    ///
    /// Records an included transaction.
    ///
    pub fn record(&mut self, contract: &str, method: &str, receipt: &Receipt) {
        let gas = receipt.gas_used;
        let entry = self
            .methods
            .entry((contract.to_owned(), method.to_owned()))
            .or_insert_with(|| MethodGas {
                calls: 0,
                min: gas,
                max: gas,
                total: U256::zero(),
                total_fee: U256::zero(),
            });
        entry.calls += 1;
        entry.min = entry.min.min(gas);
        entry.max = entry.max.max(gas);
        entry.total = entry.total.saturating_add(gas);
        entry.total_fee = entry.total_fee.saturating_add(receipt.fee());
    }

    ///
    /// The gas of `method` of `contract`, if it was called.
    ///
    pub fn method(&self, contract: &str, method: &str) -> Option<&MethodGas> {
        self.methods.get(&(contract.to_owned(), method.to_owned()))
    }

    ///
    /// Renders the report table.
    ///
    pub fn render(&self) -> String {
        let mut report = String::new();
        let header = format!(
            "{:<18} {:<18} {:>10} {:>10} {:>10} {:>8} {:>24}",
            "Contract", "Method", "Min", "Max", "Avg", "# calls", "eth (avg)"
        );
        let rule = "─".repeat(header.chars().count());

        report.push_str(self.paint_title("Gas usage").as_str());
        report.push('\n');
        report.push_str(rule.as_str());
        report.push('\n');
        report.push_str(header.as_str());
        report.push('\n');
        report.push_str(rule.as_str());
        report.push('\n');

        for ((contract, method), gas) in self.methods.iter() {
            let line = format!(
                "{:<18} {:<18} {:>10} {:>10} {:>10} {:>8} {:>24}",
                contract,
                method,
                gas.min.to_string(),
                gas.max.to_string(),
                gas.average().to_string(),
                gas.calls,
                units::format_ether(gas.average_fee()),
            );
            report.push_str(self.paint_row(line).as_str());
            report.push('\n');
        }

        report.push_str(rule.as_str());
        report.push('\n');
        report.push_str(
            format!(
                "Costs are shown in ETH at the observed gas price; {} conversion is not performed.\n",
                self.config.currency
            )
            .as_str(),
        );
        report
    }

    ///
    /// Writes the report to `path`, or prints it when no path is given.
    ///
    pub fn write(&self, path: Option<&Path>) -> anyhow::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let report = self.render();
        match path {
            Some(path) => {
                std::fs::write(path, report.as_bytes()).with_context(|| {
                    format!("Failed to write the gas report `{}`", path.display())
                })?;
                tracing::info!(path = %path.display(), "gas report written");
            }
            None => print!("{report}"),
        }
        Ok(())
    }

    fn paint_title(&self, title: &str) -> String {
        if self.config.no_colors {
            title.to_owned()
        } else {
            title.bright_green().bold().to_string()
        }
    }

    fn paint_row(&self, row: String) -> String {
        if self.config.no_colors {
            row
        } else {
            row.bright_white().to_string()
        }
    }
}
