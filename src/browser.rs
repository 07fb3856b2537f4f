use crate::error::{Result, StartError};
use crate::start::BrowserLauncher;
use std::process::{Command, Stdio};
use tracing::debug;

/// Program and leading arguments that open a URL, keyed by `std::env::consts::OS`.
const LAUNCHERS: &[(&str, &str, &[&str])] = &[
    ("windows", "rundll32", &["url.dll,FileProtocolHandler"]),
    ("linux", "xdg-open", &[]),
];

/// Used for every platform not listed above (macOS and the BSDs).
const FALLBACK: (&str, &[&str]) = ("open", &[]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

pub fn launch_command(os: &str, url: &str) -> LaunchCommand {
    let (program, prefix) = LAUNCHERS
        .iter()
        .find(|(platform, _, _)| *platform == os)
        .map(|(_, program, prefix)| (*program, *prefix))
        .unwrap_or(FALLBACK);

    let mut args: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
    args.push(url.to_string());
    LaunchCommand {
        program: program.to_string(),
        args,
    }
}

/// Fire-and-forget launcher: the command is spawned, never waited on.
#[derive(Debug, Clone)]
pub struct SystemBrowser {
    os: String,
}

impl SystemBrowser {
    pub fn new() -> Self {
        Self::for_platform(std::env::consts::OS)
    }

    pub fn for_platform(os: &str) -> Self {
        Self { os: os.to_string() }
    }
}

impl Default for SystemBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        spawn_launcher(&launch_command(&self.os, url), url)
    }
}

pub fn spawn_launcher(cmd: &LaunchCommand, url: &str) -> Result<()> {
    debug!("{} {}", cmd.program, cmd.args.join(" "));
    Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        // The launcher hands off to the browser and exits at once; the
        // dropped Child is never waited on.
        .map(|_| ())
        .map_err(|e| StartError::BrowserLaunch {
            url: url.to_string(),
            reason: format!("{}: {e}", cmd.program),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:9081";

    #[test]
    fn windows_uses_url_dll() {
        assert_eq!(
            launch_command("windows", URL),
            LaunchCommand {
                program: "rundll32".to_string(),
                args: vec!["url.dll,FileProtocolHandler".to_string(), URL.to_string()],
            }
        );
    }

    #[test]
    fn linux_uses_xdg_open() {
        assert_eq!(
            launch_command("linux", URL),
            LaunchCommand {
                program: "xdg-open".to_string(),
                args: vec![URL.to_string()],
            }
        );
    }

    #[test]
    fn everything_else_uses_open() {
        for os in ["macos", "freebsd", "openbsd"] {
            let cmd = launch_command(os, URL);
            assert_eq!(cmd.program, "open", "{os}");
            assert_eq!(cmd.args, vec![URL.to_string()]);
        }
    }

    #[test]
    fn missing_launcher_is_a_launch_error() {
        let cmd = LaunchCommand {
            program: "meshery-start-no-such-launcher".to_string(),
            args: vec![URL.to_string()],
        };
        match spawn_launcher(&cmd, URL) {
            Err(StartError::BrowserLaunch { url, reason }) => {
                assert_eq!(url, URL);
                assert!(reason.starts_with("meshery-start-no-such-launcher"), "{reason}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn launcher_is_spawned_without_waiting() {
        let cmd = LaunchCommand {
            program: "true".to_string(),
            args: vec![URL.to_string()],
        };
        spawn_launcher(&cmd, URL).unwrap();
    }
}
