use crate::common::is_positive_finite;
use crate::domain::{RadMesh, WavefrontError, WavefrontResult};
use crate::modules::intensity::IntensityKind;
use crate::modules::optics::Beamline;
use crate::modules::source::{ElectronBeam, MagneticFieldContainer, SrMethod};
use serde::{Deserialize, Serialize};

/// Partially-coherent accumulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiElectronConfig {
    pub method: SrMethod,
    pub relative_precision: f64,
    /// Total macro-electron budget shared by all processes.
    pub macro_electrons: usize,
    /// Macro-electrons averaged by one process before its contribution is sent.
    pub averaging_per_process: usize,
    /// Checkpoint cadence, counted in received contributions.
    pub checkpoint_period: usize,
    /// Factor for adjusting nx, ny of the mesh ahead of propagation (effective if > 0).
    pub sampling_factor: f64,
    #[serde(default = "default_accumulated_kind")]
    pub kind: IntensityKind,
    /// Propagate each macro-electron through the beamline before accumulating.
    #[serde(default = "default_propagate")]
    pub propagate: bool,
}

fn default_accumulated_kind() -> IntensityKind {
    IntensityKind::MultiElectron
}

fn default_propagate() -> bool {
    true
}

impl Default for MultiElectronConfig {
    fn default() -> Self {
        Self {
            method: SrMethod::AutoUndulator,
            relative_precision: 0.01,
            macro_electrons: 50_000,
            averaging_per_process: 5,
            checkpoint_period: 10,
            sampling_factor: 0.25,
            kind: IntensityKind::MultiElectron,
            propagate: true,
        }
    }
}

impl MultiElectronConfig {
    pub fn validate(&self) -> WavefrontResult<()> {
        if !is_positive_finite(self.relative_precision) {
            return Err(WavefrontError::input_validation(
                "INPUT.ACCUMULATION",
                format!(
                    "accumulation relative precision must be positive, got {}",
                    self.relative_precision
                ),
            ));
        }
        for (value, label) in [
            (self.macro_electrons, "macro-electron budget"),
            (self.averaging_per_process, "per-process averaging count"),
            (self.checkpoint_period, "checkpoint period"),
        ] {
            if value == 0 {
                return Err(WavefrontError::input_validation(
                    "INPUT.ACCUMULATION",
                    format!("accumulation {} must be at least 1", label),
                ));
            }
        }
        if self
            .averaging_per_process
            .checked_mul(self.checkpoint_period)
            .is_none()
        {
            return Err(WavefrontError::input_validation(
                "INPUT.ACCUMULATION",
                format!(
                    "checkpoint cadence {} x {} macro-electrons overflows",
                    self.averaging_per_process, self.checkpoint_period
                ),
            ));
        }
        if !self.sampling_factor.is_finite() || self.sampling_factor < 0.0 {
            return Err(WavefrontError::input_validation(
                "INPUT.ACCUMULATION",
                format!(
                    "accumulation sampling factor must be zero or positive, got {}",
                    self.sampling_factor
                ),
            ));
        }
        Ok(())
    }

    /// Macro-electrons processed between two checkpoints of the accumulated intensity.
    pub fn macro_electrons_per_checkpoint(&self) -> usize {
        self.averaging_per_process
            .checked_mul(self.checkpoint_period)
            .unwrap_or(usize::MAX)
    }
}

/// Everything an engine needs for one accumulation run.
#[derive(Debug, Clone, Copy)]
pub struct MultiElectronRequest<'a> {
    pub beam: &'a ElectronBeam,
    pub field: &'a MagneticFieldContainer,
    /// Copy of the initial wavefront mesh, taken before any single-electron calculation.
    pub mesh: RadMesh,
    pub settings: &'a MultiElectronConfig,
    pub beamline: Option<&'a Beamline>,
}

/// Receives snapshots of the accumulated intensity while a long run is in progress.
pub trait CheckpointSink {
    fn checkpoint(
        &mut self,
        intensity: &[f32],
        mesh: &RadMesh,
        macro_electrons_done: usize,
    ) -> WavefrontResult<()>;
}

/// Accumulated intensity returned on the process that holds the combined result.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedIntensity {
    pub mesh: RadMesh,
    pub values: Vec<f32>,
    pub macro_electrons: usize,
}
