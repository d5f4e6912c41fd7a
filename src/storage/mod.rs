//! Storage layer for Siren's on-disk files.
//!
//! Two files are persisted, each as KDL:
//!
//! - `config.kdl` under the config directory (`$SN_CONFIG_DIR`, or `~/.config/siren/`)
//! - `state.kdl` under the data directory (`$SN_DATA_DIR`, or `~/.local/share/siren/`)
//!
//! Units and incidents are never written here; they live in memory for the
//! lifetime of one invocation.

use crate::config::{CONFIG_FILE_MODE, STATE_FILE_MODE, ShellConfig, SirenState};
use crate::{Error, Result};
use kdl::KdlDocument;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the data directory (state.kdl).
pub const DATA_DIR_ENV: &str = "SN_DATA_DIR";

/// Overrides the config directory (config.kdl).
pub const CONFIG_DIR_ENV: &str = "SN_CONFIG_DIR";

const APP_DIR: &str = "siren";
const CONFIG_FILE: &str = "config.kdl";
const STATE_FILE: &str = "state.kdl";

/// Locations of Siren's persisted files.
#[derive(Debug, Clone)]
pub struct Storage {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl Storage {
    /// Resolve directories from the environment, falling back to the
    /// platform config and data directories.
    pub fn open() -> Result<Self> {
        let config_dir = match env_dir(CONFIG_DIR_ENV) {
            Some(dir) => dir,
            None => dirs::config_dir()
                .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))?
                .join(APP_DIR),
        };
        let data_dir = match env_dir(DATA_DIR_ENV) {
            Some(dir) => dir,
            None => dirs::data_dir()
                .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?
                .join(APP_DIR),
        };
        Ok(Self::with_dirs(config_dir, data_dir))
    }

    /// Use explicit directories. Nothing is created until a write.
    pub fn with_dirs(config_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    /// Read config.kdl. A missing file is an empty config.
    pub fn read_config(&self) -> Result<ShellConfig> {
        Ok(read_kdl(&self.config_path())?
            .map(|doc| ShellConfig::from_kdl(&doc))
            .unwrap_or_default())
    }

    /// Validate and write config.kdl.
    pub fn write_config(&self, config: &ShellConfig) -> Result<()> {
        config.validate().map_err(Error::InvalidInput)?;
        let path = self.config_path();
        write_kdl(&path, config.to_kdl(), CONFIG_FILE_MODE)
    }

    /// Read state.kdl. A missing file is an empty state.
    pub fn read_state(&self) -> Result<SirenState> {
        Ok(read_kdl(&self.state_path())?
            .map(|doc| SirenState::from_kdl(&doc))
            .unwrap_or_default())
    }

    /// Write state.kdl, owner read/write only.
    pub fn write_state(&self, state: &SirenState) -> Result<()> {
        let path = self.state_path();
        write_kdl(&path, state.to_kdl(), STATE_FILE_MODE)
    }
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn read_kdl(path: &Path) -> Result<Option<KdlDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let doc: KdlDocument = content.parse()?;
    debug!(path = %path.display(), "loaded kdl");
    Ok(Some(doc))
}

fn write_kdl(path: &Path, mut doc: KdlDocument, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    doc.autoformat();
    let mut file = open_for_write(path, mode)?;
    file.write_all(doc.to_string().as_bytes())?;
    debug!(path = %path.display(), "wrote kdl");
    Ok(())
}

/// Open `path` for a full rewrite with `mode` applied before any bytes land.
///
/// A new file is created with `mode`; an existing one is narrowed to it
/// before truncation.
#[cfg(unix)]
fn open_for_write(path: &Path, mode: u32) -> Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .mode(mode)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(mode))?;
    file.set_len(0)?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_for_write(path: &Path, _mode: u32) -> Result<File> {
    Ok(File::create(path)?)
}
