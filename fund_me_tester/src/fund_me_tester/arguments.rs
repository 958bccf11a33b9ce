//!
//! The fund me tester arguments.
//!

use std::path::PathBuf;

use structopt::StructOpt;

///
/// The fund me tester arguments.
///
#[derive(Debug, StructOpt)]
#[structopt(
    name = "fund-me-tester",
    about = "Acceptance testing of the FundMe crowdfunding contract"
)]
pub struct Arguments {
    /// Prints passed and ignored scenarios and informational logs.
    #[structopt(short = "v", long = "verbose")]
    pub verbosity: bool,

    /// Suppresses the output completely.
    #[structopt(short = "q", long = "quiet")]
    pub quiet: bool,

    /// The project configuration file.
    #[structopt(short = "c", long = "config", default_value = "fund-me.yaml")]
    pub config: PathBuf,

    /// The network to run on. Defaults to `default_network` of the configuration.
    #[structopt(short = "n", long = "network")]
    pub network: Option<String>,

    /// Runs only scenarios whose name contains any string from the specified ones.
    #[structopt(short = "p", long = "path")]
    pub paths: Vec<String>,

    /// Runs only scenarios from the specified groups: `staging`, `unit`.
    #[structopt(short = "g", long = "group")]
    pub groups: Vec<fund_me_tester::Group>,

    /// Choose between `check` to validate the project and the network without
    /// sending transactions, and `run` to run the scenarios.
    #[structopt(long = "workflow", default_value = "run")]
    pub workflow: fund_me_tester::Workflow,

    /// Emits the logs as JSON lines.
    #[structopt(long = "json")]
    pub json: bool,
}

impl Arguments {
    ///
    /// A shortcut constructor.
    ///
    pub fn new() -> Self {
        Self::from_args()
    }
}
