use crate::common::constants::{DEFLECTION_PARAMETER_FACTOR, PHOTON_ENERGY_WAVELENGTH_PRODUCT};
use crate::common::is_positive_finite;
use crate::domain::{WavefrontError, WavefrontResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPlane {
    #[serde(rename = "h")]
    Horizontal,
    #[serde(rename = "v")]
    Vertical,
}

/// One sinusoidal field harmonic of a planar or elliptical undulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UndulatorHarmonic {
    pub order: u32,
    pub plane: FieldPlane,
    /// Peak magnetic field [T].
    pub peak_field: f64,
    /// Initial phase [rad].
    pub phase: f64,
    /// Symmetry vs longitudinal position: 1 symmetric, -1 anti-symmetric.
    pub symmetry: i8,
    #[serde(default = "unit_coefficient")]
    pub longitudinal_coefficient: f64,
}

fn unit_coefficient() -> f64 {
    1.0
}

impl UndulatorHarmonic {
    pub const fn new(
        order: u32,
        plane: FieldPlane,
        peak_field: f64,
        phase: f64,
        symmetry: i8,
    ) -> Self {
        Self {
            order,
            plane,
            peak_field,
            phase,
            symmetry,
            longitudinal_coefficient: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Undulator {
    pub harmonics: Vec<UndulatorHarmonic>,
    /// Period length [m].
    pub period: f64,
    /// Number of periods, terminations excluded.
    pub periods: f64,
}

impl Undulator {
    pub fn validate(&self) -> WavefrontResult<()> {
        if !is_positive_finite(self.period) || !is_positive_finite(self.periods) {
            return Err(WavefrontError::input_validation(
                "INPUT.UNDULATOR",
                format!(
                    "undulator needs a positive period and period count, got {} m x {}",
                    self.period, self.periods
                ),
            ));
        }
        if self.harmonics.is_empty() {
            return Err(WavefrontError::input_validation(
                "INPUT.UNDULATOR",
                "undulator has no field harmonics",
            ));
        }
        for harmonic in &self.harmonics {
            if harmonic.order == 0 {
                return Err(WavefrontError::input_validation(
                    "INPUT.UNDULATOR_HARMONIC",
                    "undulator harmonic order must be at least 1",
                ));
            }
            if harmonic.symmetry != 1 && harmonic.symmetry != -1 {
                return Err(WavefrontError::input_validation(
                    "INPUT.UNDULATOR_HARMONIC",
                    format!(
                        "harmonic {} has symmetry {}; expected 1 or -1",
                        harmonic.order, harmonic.symmetry
                    ),
                ));
            }
            if !harmonic.peak_field.is_finite() || !harmonic.phase.is_finite() {
                return Err(WavefrontError::input_validation(
                    "INPUT.UNDULATOR_HARMONIC",
                    format!("harmonic {} has a non-finite field or phase", harmonic.order),
                ));
            }
        }
        Ok(())
    }

    fn fundamental_peak_field(&self, plane: FieldPlane) -> f64 {
        self.harmonics
            .iter()
            .filter(|harmonic| harmonic.order == 1 && harmonic.plane == plane)
            .map(|harmonic| harmonic.peak_field)
            .sum()
    }

    /// Effective deflection parameter from the first-order field harmonics.
    pub fn deflection_parameter(&self) -> f64 {
        let kx = DEFLECTION_PARAMETER_FACTOR
            * self.fundamental_peak_field(FieldPlane::Horizontal)
            * self.period;
        let ky = DEFLECTION_PARAMETER_FACTOR
            * self.fundamental_peak_field(FieldPlane::Vertical)
            * self.period;
        (kx * kx + ky * ky).sqrt()
    }

    /// On-axis photon energy [eV] of the first radiation harmonic.
    pub fn fundamental_photon_energy(&self, gamma: f64) -> f64 {
        let k = self.deflection_parameter();
        let wavelength = self.period * (1.0 + 0.5 * k * k) / (2.0 * gamma * gamma);
        PHOTON_ENERGY_WAVELENGTH_PRODUCT / wavelength
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedUndulator {
    pub undulator: Undulator,
    /// Centre position `[x, y, z]` [m]; z is relative to the straight-section centre.
    pub center: [f64; 3],
}

/// All magnetic field elements seen by the electron beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagneticFieldContainer {
    pub elements: Vec<PlacedUndulator>,
}

impl MagneticFieldContainer {
    pub fn single(undulator: Undulator, center: [f64; 3]) -> Self {
        Self {
            elements: vec![PlacedUndulator { undulator, center }],
        }
    }

    pub fn validate(&self) -> WavefrontResult<()> {
        if self.elements.is_empty() {
            return Err(WavefrontError::input_validation(
                "INPUT.FIELD_CONTAINER",
                "magnetic field container is empty",
            ));
        }
        for placed in &self.elements {
            placed.undulator.validate()?;
            if placed.center.iter().any(|coordinate| !coordinate.is_finite()) {
                return Err(WavefrontError::input_validation(
                    "INPUT.FIELD_CONTAINER",
                    "undulator centre has a non-finite coordinate",
                ));
            }
        }
        Ok(())
    }

    pub fn primary_undulator(&self) -> Option<&Undulator> {
        self.elements.first().map(|placed| &placed.undulator)
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldPlane, MagneticFieldContainer, Undulator, UndulatorHarmonic};

    fn planar_undulator() -> Undulator {
        Undulator {
            harmonics: vec![
                UndulatorHarmonic::new(1, FieldPlane::Vertical, 0.3545, 0.0, -1),
                UndulatorHarmonic::new(1, FieldPlane::Horizontal, 0.0, 0.0, 1),
            ],
            period: 0.033,
            periods: 72.5,
        }
    }

    #[test]
    fn deflection_parameter_uses_first_harmonics() {
        let undulator = planar_undulator();
        let k = undulator.deflection_parameter();
        assert!((k - 1.0923).abs() < 1.0e-3, "K was {}", k);
    }

    #[test]
    fn fundamental_energy_matches_seven_gev_beam() {
        let gamma = 7.0 / 0.51099890221e-03;
        let energy = planar_undulator().fundamental_photon_energy(gamma);
        assert!((energy - 8830.0).abs() < 10.0, "E1 was {}", energy);
    }

    #[test]
    fn invalid_symmetry_is_rejected() {
        let mut undulator = planar_undulator();
        undulator.harmonics[0].symmetry = 0;
        let error = undulator.validate().expect_err("symmetry 0 is invalid");
        assert_eq!(error.placeholder(), "INPUT.UNDULATOR_HARMONIC");
    }

    #[test]
    fn container_requires_elements() {
        let empty = MagneticFieldContainer {
            elements: Vec::new(),
        };
        assert!(empty.validate().is_err());

        let single = MagneticFieldContainer::single(planar_undulator(), [0.0, 0.0, 1.25]);
        assert!(single.validate().is_ok());
        assert_eq!(single.primary_undulator().map(|u| u.period), Some(0.033));
    }

    #[test]
    fn field_plane_serializes_as_single_letter() {
        let json = serde_json::to_string(&FieldPlane::Vertical).expect("serialize plane");
        assert_eq!(json, "\"v\"");
    }
}
