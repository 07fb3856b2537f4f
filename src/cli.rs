use crate::browser::SystemBrowser;
use crate::config::{Settings, StartOptions};
use crate::docker::{DockerCompose, DockerRuntime};
use crate::fetch::HttpFetcher;
use crate::start::{self, Collaborators, Outcome};
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "meshery-start",
    version,
    about = "Manage a local Meshery deployment"
)]
pub struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Commands {
    /// Run 'docker-compose' to start Meshery and each of its service mesh adapters.
    Start {
        /// (optional) skip checking for new Meshery's container images.
        #[arg(long)]
        skip_update: bool,

        /// (optional) reset Meshery's configuration file to default settings.
        #[arg(long)]
        reset: bool,
    },
}

impl Commands {
    pub fn start_options(&self) -> StartOptions {
        match *self {
            Commands::Start { skip_update, reset } => StartOptions { skip_update, reset },
        }
    }
}

pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

pub async fn run(args: Cli) -> Result<Outcome> {
    let opts = args.command.start_options();
    let settings = Settings::load()?;
    tracing::debug!(?settings, ?opts, "resolved settings");

    let orchestrator = DockerCompose::new(&settings.docker_bin, &settings.compose_bin);
    let runtime = DockerRuntime;
    let fetcher = HttpFetcher::new();
    let browser = SystemBrowser::new();
    let deps = Collaborators {
        orchestrator: &orchestrator,
        runtime: &runtime,
        fetcher: &fetcher,
        browser: &browser,
    };

    Ok(start::run(&settings, &opts, &deps).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_to_false() {
        let cli = Cli::try_parse_from(["meshery-start", "start"]).unwrap();
        assert_eq!(cli.command.start_options(), StartOptions::default());
        assert!(!cli.verbose);
    }

    #[test]
    fn flags_are_parsed() {
        let cli = Cli::try_parse_from(["meshery-start", "start", "--skip-update", "--reset"]).unwrap();
        assert_eq!(
            cli.command.start_options(),
            StartOptions {
                skip_update: true,
                reset: true,
            }
        );
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["meshery-start", "start", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn positional_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["meshery-start", "start", "now"]).is_err());
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Cli::try_parse_from(["meshery-start", "start", "--force"]).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["meshery-start"]).is_err());
    }
}
