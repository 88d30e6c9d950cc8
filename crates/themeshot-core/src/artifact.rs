use serde::Serialize;
use std::path::{Path, PathBuf};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
pub const ERROR_ARTIFACT: &str = "error.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Theme,
    Preview,
    Error,
}

/// Screenshot written during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size: u64,
}

/// Writes screenshots into the output directory, overwriting previous runs
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn error_path(&self) -> PathBuf {
        self.path_for(ERROR_ARTIFACT)
    }

    /// Write PNG bytes to `<output_dir>/<name>`
    pub fn write(&self, kind: ArtifactKind, name: &str, png: &[u8]) -> std::io::Result<Artifact> {
        if png.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("refusing to write empty screenshot {}", name),
            ));
        }
        if !png.starts_with(&PNG_SIGNATURE) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("screenshot {} is not a PNG image", name),
            ));
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(name);
        std::fs::write(&path, png)?;
        tracing::debug!("Wrote {} bytes to {}", png.len(), path.display());

        Ok(Artifact {
            kind,
            path,
            size: png.len() as u64,
        })
    }
}

#[cfg(test)]
pub(crate) fn fake_png(payload: &[u8]) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(payload);
    bytes
}
