use std::process::ExitCode;

use apicontract::cmd::{run_suite, scenario_names, Cli};
use apicontract::log::init_tracing;
use clap::Parser;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // tokens may live in .env
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    if cli.list {
        for name in scenario_names() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    match run_suite(&cli).await {
        Ok(report) => {
            println!("{report}");
            if report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            error!(error = %err, "suite aborted");
            ExitCode::from(2)
        }
    }
}
