mod beam;
mod undulator;

pub use beam::{ElectronBeam, ParticleMoments, SECOND_MOMENT_COUNT, moment};
pub use undulator::{
    FieldPlane, MagneticFieldContainer, PlacedUndulator, Undulator, UndulatorHarmonic,
};

use crate::common::is_positive_finite;
use crate::domain::{WavefrontError, WavefrontResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SrMethod {
    Manual,
    AutoUndulator,
    AutoWiggler,
}

impl SrMethod {
    pub const fn code(self) -> u8 {
        match self {
            Self::Manual => 0,
            Self::AutoUndulator => 1,
            Self::AutoWiggler => 2,
        }
    }
}

/// Precision parameters of the single-electron field calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SrPrecision {
    pub method: SrMethod,
    pub relative_precision: f64,
    /// Integration limits are effective only when `z_start_integration < z_end_integration`.
    pub z_start_integration: f64,
    pub z_end_integration: f64,
    pub trajectory_points: usize,
    pub use_terminating_terms: bool,
    /// Factor for adjusting nx, ny of the mesh ahead of propagation (effective if > 0).
    pub sampling_factor: f64,
}

impl Default for SrPrecision {
    fn default() -> Self {
        Self {
            method: SrMethod::AutoUndulator,
            relative_precision: 0.01,
            z_start_integration: 0.0,
            z_end_integration: 0.0,
            trajectory_points: 20_000,
            use_terminating_terms: true,
            sampling_factor: 0.0,
        }
    }
}

impl SrPrecision {
    pub fn without_sampling(mut self) -> Self {
        self.sampling_factor = 0.0;
        self
    }

    pub fn has_integration_limits(&self) -> bool {
        self.z_start_integration < self.z_end_integration
    }

    /// Flat parameter tuple in the order numerical SR engines conventionally take it.
    pub fn as_array(&self) -> [f64; 7] {
        [
            f64::from(self.method.code()),
            self.relative_precision,
            self.z_start_integration,
            self.z_end_integration,
            self.trajectory_points as f64,
            if self.use_terminating_terms { 1.0 } else { 0.0 },
            self.sampling_factor,
        ]
    }

    pub fn validate(&self) -> WavefrontResult<()> {
        if !is_positive_finite(self.relative_precision) {
            return Err(WavefrontError::input_validation(
                "INPUT.SR_PRECISION",
                format!(
                    "relative precision must be positive, got {}",
                    self.relative_precision
                ),
            ));
        }
        if self.trajectory_points < 2 {
            return Err(WavefrontError::input_validation(
                "INPUT.SR_PRECISION",
                format!(
                    "trajectory needs at least 2 points, got {}",
                    self.trajectory_points
                ),
            ));
        }
        if !self.sampling_factor.is_finite() || self.sampling_factor < 0.0 {
            return Err(WavefrontError::input_validation(
                "INPUT.SR_PRECISION",
                format!(
                    "sampling factor must be zero or positive, got {}",
                    self.sampling_factor
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SrMethod, SrPrecision};

    #[test]
    fn precision_array_follows_conventional_order() {
        let precision = SrPrecision {
            sampling_factor: 0.25,
            ..SrPrecision::default()
        };
        assert_eq!(
            precision.as_array(),
            [1.0, 0.01, 0.0, 0.0, 20_000.0, 1.0, 0.25]
        );
        assert_eq!(precision.without_sampling().as_array()[6], 0.0);
        assert!(!precision.has_integration_limits());
    }

    #[test]
    fn method_serializes_in_kebab_case() {
        let json = serde_json::to_string(&SrMethod::AutoUndulator).expect("serialize");
        assert_eq!(json, "\"auto-undulator\"");
    }

    #[test]
    fn negative_sampling_factor_is_rejected() {
        let precision = SrPrecision {
            sampling_factor: -1.0,
            ..SrPrecision::default()
        };
        let error = precision.validate().expect_err("negative factor");
        assert_eq!(error.placeholder(), "INPUT.SR_PRECISION");
    }
}
