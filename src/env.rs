use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load `<state_dir>/.env` into the process environment.
/// Variables already set in the environment win over the file.
pub fn load_env(state_dir: &Path) -> Result<Option<PathBuf>> {
    let path = state_dir.join(".env");
    if !path.exists() {
        return Ok(None);
    }
    dotenvy::from_path(&path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(Some(path))
}
