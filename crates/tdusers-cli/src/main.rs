use clap::Parser;
use tdusers_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Verbose runs log to stderr; otherwise to the state file.
    logging::init(cli.verbose);

    if let Err(err) = cli.run().await {
        eprintln!("tdusers error: {:#}", err);
        std::process::exit(1);
    }
}
