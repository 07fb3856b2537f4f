use crate::error::{Result, StartError};
use crate::start::{ContainerDescriptor, ContainerRuntime, Orchestrator};
use async_trait::async_trait;
use bollard::models::ContainerSummary;
use bollard::query_parameters::ListContainersOptions;
use bollard::Docker;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// `docker-compose` driven as a subprocess.
#[derive(Debug, Clone)]
pub struct DockerCompose {
    pub docker_bin: String,
    pub compose_bin: String,
}

impl DockerCompose {
    pub fn new(docker_bin: &str, compose_bin: &str) -> Self {
        Self {
            docker_bin: docker_bin.to_string(),
            compose_bin: compose_bin.to_string(),
        }
    }

    /// Run with stdout/stderr attached to the user's terminal.
    async fn run_inherited(&self, args: &[String]) -> Result<ExitStatus> {
        debug!("{} {}", self.compose_bin, args.join(" "));
        Command::new(&self.compose_bin)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| StartError::Spawn {
                program: self.compose_bin.clone(),
                source,
            })
    }
}

pub fn compose_args(definition: &Path, subcommand: &[&str]) -> Vec<String> {
    let mut args = vec!["-f".to_string(), definition.display().to_string()];
    args.extend(subcommand.iter().map(|s| s.to_string()));
    args
}

async fn tool_available(bin: &str) -> bool {
    Command::new(bin)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

#[async_trait]
impl Orchestrator for DockerCompose {
    async fn ensure_installed(&self) -> Result<()> {
        for bin in [&self.docker_bin, &self.compose_bin] {
            if !tool_available(bin).await {
                return Err(StartError::MissingPrerequisite { tool: bin.clone() });
            }
        }
        Ok(())
    }

    async fn pull(&self, definition: &Path) -> Result<()> {
        let status = self.run_inherited(&compose_args(definition, &["pull"])).await?;
        if !status.success() {
            return Err(StartError::ImagePull {
                status: status.to_string(),
            });
        }
        Ok(())
    }

    async fn up(&self, definition: &Path) -> Result<()> {
        let status = self.run_inherited(&compose_args(definition, &["up", "-d"])).await?;
        if !status.success() {
            return Err(StartError::ComposeUp {
                status: status.to_string(),
            });
        }
        Ok(())
    }

    async fn follow_logs(&self, definition: &Path) -> Result<()> {
        let mut child = Command::new(&self.compose_bin)
            .args(compose_args(definition, &["logs", "-f"]))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StartError::LogFollow {
                reason: format!("failed to start {}: {e}", self.compose_bin),
            })?;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        if let Some(out) = child.stdout.take() {
            forward_lines(out, tx.clone());
        }
        if let Some(err) = child.stderr.take() {
            forward_lines(err, tx.clone());
        }
        drop(tx);

        let relay = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                info!("{line}");
            }
        });

        let status = child.wait().await.map_err(|e| StartError::LogFollow {
            reason: e.to_string(),
        })?;
        // Readers end at EOF, which closes the channel and ends the relay.
        relay.await.map_err(|e| StartError::LogFollow {
            reason: format!("log relay failed: {e}"),
        })?;

        if !status.success() {
            return Err(StartError::LogFollow {
                reason: format!("{} exited with {status}", self.compose_bin),
            });
        }
        Ok(())
    }
}

/// Send every line of `reader` to `tx` until EOF. Bytes that are not
/// UTF-8 are replaced rather than ending the stream, so the child never
/// loses its reader mid-run.
pub fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut segments = BufReader::new(reader).split(b'\n');
        loop {
            match segments.next_segment().await {
                Ok(Some(raw)) => {
                    let line = String::from_utf8_lossy(&raw);
                    let _ = tx.send(line.trim_end_matches('\r').to_string());
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("log reader stopped: {e}");
                    break;
                }
            }
        }
    })
}

/// Docker Engine API client, connected on first use.
#[derive(Debug, Default, Clone)]
pub struct DockerRuntime;

pub fn descriptor_from(summary: &ContainerSummary) -> ContainerDescriptor {
    ContainerDescriptor {
        name: summary
            .names
            .as_ref()
            .and_then(|n| n.first())
            .cloned()
            .unwrap_or_default(),
        status: summary.status.clone().unwrap_or_default(),
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn running_containers(&self) -> Result<Vec<ContainerDescriptor>> {
        let docker = Docker::connect_with_defaults().map_err(|e| StartError::RuntimeQuery {
            reason: e.to_string(),
        })?;

        let options = ListContainersOptions {
            all: false,
            ..Default::default()
        };
        let containers = docker
            .list_containers(Some(options))
            .await
            .map_err(|e| StartError::RuntimeQuery {
                reason: e.to_string(),
            })?;

        Ok(containers.iter().map(descriptor_from).collect())
    }
}
