use crate::domain::{ProcessRole, RadMesh, WavefrontResult};
use crate::modules::accumulation::CheckpointSink;
use crate::modules::serialization::write_intensity_table;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes accumulated-intensity snapshots on the coordinator; other ranks discard them.
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    path: PathBuf,
    role: ProcessRole,
    written: usize,
    discarded: usize,
    last_macro_electrons: Option<usize>,
}

impl CheckpointWriter {
    pub fn new(path: impl Into<PathBuf>, role: ProcessRole) -> Self {
        Self {
            path: path.into(),
            role,
            written: 0,
            discarded: 0,
            last_macro_electrons: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Macro-electron count of the last snapshot on disk.
    pub fn last_macro_electrons(&self) -> Option<usize> {
        self.last_macro_electrons
    }
}

impl CheckpointSink for CheckpointWriter {
    fn checkpoint(
        &mut self,
        intensity: &[f32],
        mesh: &RadMesh,
        macro_electrons_done: usize,
    ) -> WavefrontResult<()> {
        if !self.role.is_coordinator() {
            if self.discarded == 0 {
                warn!(
                    path = %self.path.display(),
                    "worker received an accumulation snapshot; only the coordinator writes checkpoints"
                );
            }
            self.discarded += 1;
            return Ok(());
        }

        write_intensity_table(&self.path, intensity, mesh)?;
        self.written += 1;
        self.last_macro_electrons = Some(macro_electrons_done);
        debug!(
            path = %self.path.display(),
            macro_electrons = macro_electrons_done,
            "wrote accumulation checkpoint"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CheckpointWriter;
    use crate::domain::{ProcessRole, RadMesh};
    use crate::modules::accumulation::CheckpointSink;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn coordinator_overwrites_the_checkpoint_file() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("part_coh.dat");
        let mesh = RadMesh::new(1, 2, 1);
        let mut writer = CheckpointWriter::new(&path, ProcessRole::Coordinator);

        writer.checkpoint(&[1.0, 2.0], &mesh, 50).expect("first snapshot");
        writer.checkpoint(&[3.0, 4.0], &mesh, 100).expect("second snapshot");

        let content = fs::read_to_string(&path).expect("checkpoint readable");
        let data: Vec<&str> = content.lines().skip(9).collect();
        assert_eq!(data, vec![" 3.0", " 4.0"]);
        assert_eq!(writer.written(), 2);
        assert_eq!(writer.last_macro_electrons(), Some(100));
    }

    #[test]
    fn worker_discards_snapshots_without_touching_disk() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("part_coh.dat");
        let mut writer = CheckpointWriter::new(&path, ProcessRole::Worker);
        writer
            .checkpoint(&[1.0], &RadMesh::new(1, 1, 1), 10)
            .expect("worker discards");
        assert!(!path.exists());
        assert_eq!(writer.discarded(), 1);
        assert_eq!(writer.last_macro_electrons(), None);
    }

    #[test]
    fn mismatched_snapshot_is_an_input_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut writer =
            CheckpointWriter::new(temp.path().join("part_coh.dat"), ProcessRole::Coordinator);
        let error = writer
            .checkpoint(&[1.0], &RadMesh::new(1, 2, 2), 10)
            .expect_err("short snapshot");
        assert_eq!(error.placeholder(), "INPUT.INTENSITY_LENGTH");
        assert_eq!(writer.written(), 0);
    }
}
