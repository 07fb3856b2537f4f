use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_COMPOSE_URL: &str =
    "https://raw.githubusercontent.com/layer5io/meshery/master/docker-compose.yaml";
pub const DEFAULT_UI_URL: &str = "http://localhost:9081";
pub const CONTROL_PLANE_CONTAINER: &str = "/meshery_meshery_1";

/// Flags of the `start` subcommand, fixed once parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartOptions {
    pub skip_update: bool,
    pub reset: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub state_dir: PathBuf,
    pub compose_file: PathBuf,
    pub compose_url: String,
    pub ui_url: String,
    pub docker_bin: String,
    pub compose_bin: String,
    pub control_plane: String,
}

impl Settings {
    /// Resolve settings from the process environment, after loading
    /// `<state dir>/.env` if one exists.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
        let state_dir = state_dir_for(&home, |k| std::env::var(k).ok());
        crate::env::load_env(&state_dir)?;

        Ok(Self::resolve_with(&home, |k| std::env::var(k).ok()))
    }

    pub fn resolve_with(home: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let state_dir = state_dir_for(home, &lookup);
        let compose_file = lookup("MESHERY_COMPOSE_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| state_dir.join("meshery.yaml"));

        Settings {
            compose_file,
            compose_url: non_empty(lookup("MESHERY_COMPOSE_URL"))
                .unwrap_or_else(|| DEFAULT_COMPOSE_URL.to_string()),
            ui_url: non_empty(lookup("MESHERY_UI_URL")).unwrap_or_else(|| DEFAULT_UI_URL.to_string()),
            docker_bin: non_empty(lookup("DOCKER_BIN")).unwrap_or_else(|| "docker".to_string()),
            compose_bin: non_empty(lookup("DOCKER_COMPOSE_BIN"))
                .unwrap_or_else(|| "docker-compose".to_string()),
            control_plane: CONTROL_PLANE_CONTAINER.to_string(),
            state_dir,
        }
    }
}

fn state_dir_for(home: &Path, lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    non_empty(lookup("MESHERY_FOLDER"))
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(".meshery"))
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Create `p` (non-recursively, like `mkdir`) with permissive mode.
pub fn create_state_dir(p: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder.create(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_live_under_home() {
        let s = Settings::resolve_with(Path::new("/home/dev"), lookup_from(&[]));
        assert_eq!(s.state_dir, PathBuf::from("/home/dev/.meshery"));
        assert_eq!(s.compose_file, PathBuf::from("/home/dev/.meshery/meshery.yaml"));
        assert_eq!(s.compose_url, DEFAULT_COMPOSE_URL);
        assert_eq!(s.ui_url, "http://localhost:9081");
        assert_eq!(s.compose_bin, "docker-compose");
        assert_eq!(s.docker_bin, "docker");
        assert_eq!(s.control_plane, "/meshery_meshery_1");
    }

    #[test]
    fn environment_overrides_paths_and_urls() {
        let s = Settings::resolve_with(
            Path::new("/home/dev"),
            lookup_from(&[
                ("MESHERY_FOLDER", "/srv/meshery"),
                ("MESHERY_UI_URL", "http://127.0.0.1:9999"),
                ("DOCKER_COMPOSE_BIN", "podman-compose"),
            ]),
        );
        assert_eq!(s.state_dir, PathBuf::from("/srv/meshery"));
        assert_eq!(s.compose_file, PathBuf::from("/srv/meshery/meshery.yaml"));
        assert_eq!(s.ui_url, "http://127.0.0.1:9999");
        assert_eq!(s.compose_bin, "podman-compose");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let s = Settings::resolve_with(
            Path::new("/home/dev"),
            lookup_from(&[("MESHERY_COMPOSE_URL", "  "), ("MESHERY_COMPOSE_FILE", "")]),
        );
        assert_eq!(s.compose_url, DEFAULT_COMPOSE_URL);
        assert_eq!(s.compose_file, PathBuf::from("/home/dev/.meshery/meshery.yaml"));
    }

    #[test]
    fn create_state_dir_fails_when_present() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".meshery");
        create_state_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert!(create_state_dir(&dir).is_err());
    }
}
