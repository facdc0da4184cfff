use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Result, TaskError};

/// Environment variable that overrides the backing file location
pub const DATA_ENV: &str = "TDL_DATA";

const APP_DIR: &str = ".tdl";
const DATA_FILE: &str = "tasks.txt";
const RC_FILE: &str = "rc";

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_location: PathBuf,
}

impl Config {
    pub fn new(data_location: impl Into<PathBuf>) -> Self {
        Self {
            data_location: data_location.into(),
        }
    }

    /// Resolve the configuration for the current user
    ///
    /// Precedence: `TDL_DATA`, then `data.location` in `~/.tdl/rc`, then
    /// `~/.tdl/tasks.txt`.
    pub fn resolve() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| TaskError::Config("could not determine home directory".to_string()))?;
        let env_override = std::env::var_os(DATA_ENV).map(PathBuf::from);
        Self::resolve_from(&home, env_override)
    }

    /// Resolve against an explicit home directory and optional override
    pub fn resolve_from(home: &Path, env_override: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = env_override.filter(|p| !p.as_os_str().is_empty()) {
            debug!("Using {} from {}", path.display(), DATA_ENV);
            return Ok(Self::new(path));
        }

        let rc_path = Self::rc_path(home);
        if rc_path.exists() {
            let content = fs::read_to_string(&rc_path).map_err(|e| TaskError::io(&rc_path, e))?;
            if let Some(path) = parse_rc(&content, &rc_path) {
                debug!("Using {} from {}", path.display(), rc_path.display());
                return Ok(Self::new(path));
            }
        }

        Ok(Self::new(Self::default_path(home)))
    }

    /// Default backing file under the user's home directory
    pub fn default_path(home: &Path) -> PathBuf {
        home.join(APP_DIR).join(DATA_FILE)
    }

    /// Configuration file path
    pub fn rc_path(home: &Path) -> PathBuf {
        home.join(APP_DIR).join(RC_FILE)
    }
}

// key=value lines; relative data paths resolve against the rc directory
fn parse_rc(content: &str, rc_path: &Path) -> Option<PathBuf> {
    let mut location = None;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            warn!("Ignoring malformed line in {}: {}", rc_path.display(), line);
            continue;
        };
        match key.trim() {
            "data.location" => {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                let path = PathBuf::from(value);
                location = Some(if path.is_relative() {
                    rc_path.parent().map(|dir| dir.join(&path)).unwrap_or(path)
                } else {
                    path
                });
            }
            other => warn!("Ignoring unknown key '{}' in {}", other, rc_path.display()),
        }
    }
    location
}
