//!
//! The fund me tester executable.
//!

pub(crate) mod arguments;

use std::time::Instant;

use anyhow::Context;
use colored::Colorize;

use self::arguments::Arguments;

///
/// The application entry point.
///
fn main() {
    let exit_code = match main_inner(Arguments::new()) {
        Ok(()) => fund_me_tester::EXIT_CODE_SUCCESS,
        Err(error) => {
            eprintln!("{error:?}");
            fund_me_tester::EXIT_CODE_FAILURE
        }
    };
    std::process::exit(exit_code);
}

///
/// The entry point wrapper used for proper error handling.
///
fn main_inner(arguments: Arguments) -> anyhow::Result<()> {
    let level = if arguments.verbosity {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    fund_me_tester::telemetry::init(arguments.json, level);

    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "environment file loaded"),
        Err(error) if error.not_found() => {}
        Err(error) => return Err(error).context("Failed to load the environment file"),
    }

    let config = fund_me_tester::ProjectConfig::load(arguments.config.as_path())?;
    let network_name = arguments
        .network
        .unwrap_or_else(|| config.default_network.clone());
    let network = config.network(network_name.as_str(), fund_me_tester::process_env)?;
    let deployer = network.named_signer(
        &config.named_accounts,
        fund_me_tester::NamedAccounts::DEPLOYER,
    )?;
    tracing::info!(
        network = %network.name,
        environment = %network.environment,
        chain_id = network.chain_id,
        deployer = ?deployer.address(),
        "network selected"
    );

    let run_time_start = Instant::now();
    match arguments.workflow {
        fund_me_tester::Workflow::Check => {
            println!(
                "    {} `{}` ({} network)",
                "Checking".bright_green().bold(),
                network.name,
                network.environment,
            );
            fund_me_tester::Checker::new(arguments.quiet).run(
                &config,
                &network,
                fund_me_tester::process_env,
            )?;
            println!(
                "    {} checking in {}m{:02}s",
                "Finished".bright_green().bold(),
                run_time_start.elapsed().as_secs() / 60,
                run_time_start.elapsed().as_secs() % 60,
            );
            Ok(())
        }
        fund_me_tester::Workflow::Run => {
            let summary = fund_me_tester::Summary::new(arguments.verbosity, arguments.quiet);
            let filters = fund_me_tester::Filters::new(arguments.paths, arguments.groups);
            let gas_reporter = fund_me_tester::GasReporter::new(config.gas_reporter.clone());

            let mut target = fund_me_tester::Target::prepare(&config, &network)?;
            println!(
                "     {} scenarios on `{}` ({} network)",
                "Running".bright_green().bold(),
                network.name,
                network.environment,
            );

            let mut tester = fund_me_tester::FundMeTester::new(
                summary,
                filters,
                gas_reporter,
                network,
                deployer,
            );
            tester.run(&mut target);

            tester
                .gas_reporter
                .write(config.gas_report_path().as_deref())?;
            print!("{}", tester.summary);
            println!(
                "    {} running scenarios in {}m{:02}s",
                "Finished".bright_green().bold(),
                run_time_start.elapsed().as_secs() / 60,
                run_time_start.elapsed().as_secs() % 60,
            );

            if !tester.summary.is_successful() {
                anyhow::bail!("Some scenarios have failed");
            }

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::arguments::Arguments;

    #[test]
    fn test_manually() {
        std::env::set_current_dir("..").expect("Change directory failed");

        let arguments = Arguments {
            verbosity: false,
            quiet: false,
            config: PathBuf::from("fund-me.yaml"),
            network: Some("hardhat".to_owned()),
            paths: vec![],
            groups: vec![fund_me_tester::Group::Unit],
            workflow: fund_me_tester::Workflow::Run,
            json: false,
        };

        crate::main_inner(arguments).expect("Manual testing failed");
    }
}
