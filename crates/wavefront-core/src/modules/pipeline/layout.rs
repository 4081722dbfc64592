use crate::common::config::OutputConfig;
use crate::domain::{WavefrontError, WavefrontResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved locations of every file a run may write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    names: OutputConfig,
}

impl OutputLayout {
    /// Places the configured output directory under `base` (absolute directories are kept).
    pub fn from_config(output: &OutputConfig, base: &Path) -> Self {
        Self {
            root: base.join(&output.directory),
            names: output.clone(),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_root(&self) -> WavefrontResult<()> {
        fs::create_dir_all(&self.root).map_err(|source| {
            WavefrontError::io_system(
                "IO.OUTPUT_DIRECTORY",
                format!(
                    "failed to create output directory '{}': {}",
                    self.root.display(),
                    source
                ),
            )
        })
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn trajectory(&self) -> PathBuf {
        self.file(&self.names.trajectory_file)
    }

    pub fn spectrum(&self) -> PathBuf {
        self.file(&self.names.spectrum_file)
    }

    pub fn initial_wavefront(&self) -> PathBuf {
        self.file(&self.names.initial_wavefront_file)
    }

    pub fn propagated_wavefront(&self) -> PathBuf {
        self.file(&self.names.propagated_wavefront_file)
    }

    pub fn partially_coherent(&self) -> PathBuf {
        self.file(&self.names.partially_coherent_file)
    }
}
