mod crl;

pub use crl::{CrlSpec, FocusingPlane, LensProfile, NON_FOCUSING_LENGTH};

use crate::domain::{RadMesh, WavefrontError, WavefrontResult};
use serde::{Deserialize, Serialize};

/// Which component of a transmission record to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransmissionMode {
    Amplitude,
    Intensity,
    PathDifference,
}

impl TransmissionMode {
    /// 1 amplitude, 2 intensity, anything else optical path difference.
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Amplitude,
            2 => Self::Intensity,
            _ => Self::PathDifference,
        }
    }

    pub const fn code(self) -> i32 {
        match self {
            Self::Amplitude => 1,
            Self::Intensity => 2,
            Self::PathDifference => 3,
        }
    }

    pub fn select(self, amplitude: f64, path_difference: f64) -> f64 {
        match self {
            Self::Amplitude => amplitude,
            Self::Intensity => amplitude * amplitude,
            Self::PathDifference => path_difference,
        }
    }
}

/// Energy slices stored by a transmission record; records without energy dependence keep one.
pub const fn energy_slice_count(mesh: &RadMesh) -> usize {
    if mesh.ne > 1 { mesh.ne } else { 1 }
}

/// Grid of `(amplitude, optical path difference)` pairs stored interleaved.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionRecord {
    mesh: RadMesh,
    data: Vec<f64>,
    focal_lengths: [f64; 2],
    transparent_outside: bool,
}

impl TransmissionRecord {
    pub fn new(mesh: RadMesh, data: Vec<f64>) -> WavefrontResult<Self> {
        if mesh.nx == 0 || mesh.ny == 0 {
            return Err(WavefrontError::input_validation(
                "INPUT.TRANSMISSION_MESH",
                format!(
                    "transmission mesh needs transverse points, got {} x {}",
                    mesh.nx, mesh.ny
                ),
            ));
        }
        let expected = Self::cell_count_for(&mesh).saturating_mul(2);
        if data.len() != expected {
            return Err(WavefrontError::input_validation(
                "INPUT.TRANSMISSION_LENGTH",
                format!(
                    "transmission data holds {} values but the mesh needs {}",
                    data.len(),
                    expected
                ),
            ));
        }
        Ok(Self {
            mesh,
            data,
            focal_lengths: [NON_FOCUSING_LENGTH, NON_FOCUSING_LENGTH],
            transparent_outside: true,
        })
    }

    pub fn with_focal_lengths(mut self, fx: f64, fy: f64) -> Self {
        self.focal_lengths = [fx, fy];
        self
    }

    fn cell_count_for(mesh: &RadMesh) -> usize {
        energy_slice_count(mesh).saturating_mul(mesh.transverse_point_count())
    }

    pub fn mesh(&self) -> &RadMesh {
        &self.mesh
    }

    pub fn cell_count(&self) -> usize {
        Self::cell_count_for(&self.mesh)
    }

    pub fn cell(&self, index: usize) -> Option<(f64, f64)> {
        let amplitude = *self.data.get(2 * index)?;
        let path_difference = *self.data.get(2 * index + 1)?;
        Some((amplitude, path_difference))
    }

    pub fn values(&self, mode: TransmissionMode) -> impl Iterator<Item = f64> + '_ {
        self.data
            .chunks_exact(2)
            .map(move |pair| mode.select(pair[0], pair[1]))
    }

    pub fn focal_lengths(&self) -> [f64; 2] {
        self.focal_lengths
    }

    /// Whether radiation outside the tabulated mesh passes unattenuated.
    pub fn transparent_outside(&self) -> bool {
        self.transparent_outside
    }
}
