//! The `start` workflow: preflight, image refresh, optional reset,
//! `compose up`, then either open the UI or follow the stack's logs.
//!
//! Everything outside this process (the compose binary, the Docker
//! Engine, the network, the desktop browser) is reached through the
//! traits below so the sequence can run against fakes.

use crate::config::{create_state_dir, Settings, StartOptions};
use crate::error::{Result, StartError};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

/// One entry of the runtime's container list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    BrowserOpened,
    LogsFollowed,
}

#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Fails when the container tooling is missing.
    async fn ensure_installed(&self) -> Result<()>;
    async fn pull(&self, definition: &Path) -> Result<()>;
    async fn up(&self, definition: &Path) -> Result<()>;
    /// Relays `logs -f` to the console until the subprocess exits.
    async fn follow_logs(&self, definition: &Path) -> Result<()>;
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn running_containers(&self) -> Result<Vec<ContainerDescriptor>>;
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

pub struct Collaborators<'a> {
    pub orchestrator: &'a dyn Orchestrator,
    pub runtime: &'a dyn ContainerRuntime,
    pub fetcher: &'a dyn Fetcher,
    pub browser: &'a dyn BrowserLauncher,
}

pub async fn run(settings: &Settings, opts: &StartOptions, deps: &Collaborators<'_>) -> Result<Outcome> {
    deps.orchestrator.ensure_installed().await?;

    if !settings.state_dir.exists() {
        debug!("creating {}", settings.state_dir.display());
        create_state_dir(&settings.state_dir).map_err(|source| StartError::StateDir {
            path: settings.state_dir.clone(),
            source,
        })?;
    }

    if !settings.compose_file.exists() {
        debug!("fetching {} from {}", settings.compose_file.display(), settings.compose_url);
        deps.fetcher
            .download(&settings.compose_url, &settings.compose_file)
            .await?;
    }

    if opts.skip_update {
        info!("Skipping Meshery update...");
    } else {
        info!("Updating Meshery now...");
        deps.orchestrator.pull(&settings.compose_file).await?;
    }

    if opts.reset {
        info!("Meshery resetting settings to default...");
        deps.fetcher
            .download(&settings.compose_url, &settings.compose_file)
            .await?;
    }

    info!("Starting Meshery...");
    deps.orchestrator.up(&settings.compose_file).await?;

    let containers = deps.runtime.running_containers().await?;
    debug!("{} running containers", containers.len());

    if let Some(control_plane) = find_control_plane(&containers, &settings.control_plane) {
        debug!("{} is {}", control_plane.name, control_plane.status);
        info!(
            "Opening Meshery in your browser. If Meshery does not open, please point your browser to {} to access Meshery.",
            settings.ui_url
        );
        deps.browser.open(&settings.ui_url)?;
        return Ok(Outcome::BrowserOpened);
    }

    info!("Starting Meshery logging . . .");
    deps.orchestrator.follow_logs(&settings.compose_file).await?;
    Ok(Outcome::LogsFollowed)
}

/// Exact match only: a renamed compose project will not be recognised.
pub fn find_control_plane<'a>(
    containers: &'a [ContainerDescriptor],
    name: &str,
) -> Option<&'a ContainerDescriptor> {
    containers.iter().find(|c| c.name == name)
}
