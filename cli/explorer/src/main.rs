//! kbx CLI
//!
//! Kafka backup explorer: REST server and one-shot tree queries.

use clap::Parser;

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize logging (to stderr, so stdout is clean for the JSON tree)
    run::init_logging(args.log_level.into())?;

    run::execute(args.command).await
}
