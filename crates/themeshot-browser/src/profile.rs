use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Browser user-data directory for one run
pub struct ProfileDir {
    path: PathBuf,
    is_temporary: bool,
}

impl ProfileDir {
    /// Fresh profile, removed on drop. No cookies survive between runs.
    pub fn temporary() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("themeshot-profile-")
            .tempdir()?;

        Ok(Self {
            path: temp_dir.keep(),
            is_temporary: true,
        })
    }

    /// Named profile under `~/.themeshot/profiles`, kept between runs
    pub fn named(name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::Browser(format!("Invalid profile name: '{}'", name)));
        }

        let root = dirs::home_dir()
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))?
            .join(".themeshot")
            .join("profiles");

        Self::persistent(root.join(name))
    }

    /// Use (and create if needed) a profile at an explicit location
    pub fn persistent(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;

        Ok(Self {
            path,
            is_temporary: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                tracing::debug!("Failed to remove profile {}: {}", self.path.display(), e);
            }
        }
    }
}
