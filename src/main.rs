mod browser;
mod cli;
mod config;
mod docker;
mod env;
mod error;
mod fetch;
mod start;

use clap::Parser;

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();
    cli::init_logging(args.verbose);

    match cli::run(args).await {
        Ok(outcome) => tracing::debug!(?outcome, "start finished"),
        Err(e) => {
            tracing::error!("{e:#}");
            std::process::exit(1);
        }
    }
}
