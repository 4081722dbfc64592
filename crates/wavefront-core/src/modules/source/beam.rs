use crate::common::constants::ELECTRON_REST_ENERGY_GEV;
use crate::common::is_positive_finite;
use crate::domain::{WavefrontError, WavefrontResult};
use serde::{Deserialize, Serialize};

pub const SECOND_MOMENT_COUNT: usize = 21;

/// Indices into [`ElectronBeam::second_moments`].
pub mod moment {
    pub const XX: usize = 0;
    pub const X_XP: usize = 1;
    pub const XP_XP: usize = 2;
    pub const YY: usize = 3;
    pub const Y_YP: usize = 4;
    pub const YP_YP: usize = 5;
    pub const RELATIVE_ENERGY_SPREAD_SQ: usize = 10;
    pub const SS: usize = 11;
}

/// First-order statistical moments of the beam at the initial longitudinal position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleMoments {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub xp: f64,
    pub yp: f64,
    /// Relative energy (Lorentz factor).
    pub gamma: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectronBeam {
    /// Average current [A].
    pub current: f64,
    pub first_moments: ParticleMoments,
    /// Central second-order moments: `<(x-x0)^2>`, `<(x-x0)(x'-x'0)>`, `<(x'-x'0)^2>`,
    /// the same for y, the x/y cross terms, then `<(E-E0)^2>/E0^2` at index 10.
    pub second_moments: [f64; SECOND_MOMENT_COUNT],
}

impl ElectronBeam {
    pub fn new(current: f64, gamma: f64) -> Self {
        Self {
            current,
            first_moments: ParticleMoments {
                gamma,
                ..ParticleMoments::default()
            },
            second_moments: [0.0; SECOND_MOMENT_COUNT],
        }
    }

    pub fn from_energy_gev(current: f64, energy_gev: f64) -> Self {
        Self::new(current, energy_gev / ELECTRON_REST_ENERGY_GEV)
    }

    pub fn with_horizontal_rms(mut self, size: f64, divergence: f64) -> Self {
        self.second_moments[moment::XX] = size * size;
        self.second_moments[moment::X_XP] = 0.0;
        self.second_moments[moment::XP_XP] = divergence * divergence;
        self
    }

    pub fn with_vertical_rms(mut self, size: f64, divergence: f64) -> Self {
        self.second_moments[moment::YY] = size * size;
        self.second_moments[moment::Y_YP] = 0.0;
        self.second_moments[moment::YP_YP] = divergence * divergence;
        self
    }

    pub fn with_relative_energy_spread(mut self, spread: f64) -> Self {
        self.second_moments[moment::RELATIVE_ENERGY_SPREAD_SQ] = spread * spread;
        self
    }

    pub fn energy_gev(&self) -> f64 {
        self.first_moments.gamma * ELECTRON_REST_ENERGY_GEV
    }

    pub fn rms_size_x(&self) -> f64 {
        self.second_moments[moment::XX].sqrt()
    }

    pub fn rms_size_y(&self) -> f64 {
        self.second_moments[moment::YY].sqrt()
    }

    pub fn rms_divergence_x(&self) -> f64 {
        self.second_moments[moment::XP_XP].sqrt()
    }

    pub fn rms_divergence_y(&self) -> f64 {
        self.second_moments[moment::YP_YP].sqrt()
    }

    pub fn relative_energy_spread(&self) -> f64 {
        self.second_moments[moment::RELATIVE_ENERGY_SPREAD_SQ].sqrt()
    }

    pub fn horizontal_emittance(&self) -> f64 {
        plane_emittance(
            self.second_moments[moment::XX],
            self.second_moments[moment::X_XP],
            self.second_moments[moment::XP_XP],
        )
    }

    pub fn vertical_emittance(&self) -> f64 {
        plane_emittance(
            self.second_moments[moment::YY],
            self.second_moments[moment::Y_YP],
            self.second_moments[moment::YP_YP],
        )
    }

    pub fn validate(&self) -> WavefrontResult<()> {
        if !self.current.is_finite() || self.current < 0.0 {
            return Err(WavefrontError::input_validation(
                "INPUT.ELECTRON_BEAM",
                format!("beam current must be non-negative, got {}", self.current),
            ));
        }
        if !is_positive_finite(self.first_moments.gamma) || self.first_moments.gamma < 1.0 {
            return Err(WavefrontError::input_validation(
                "INPUT.ELECTRON_BEAM",
                format!(
                    "relative energy (gamma) must be at least 1, got {}",
                    self.first_moments.gamma
                ),
            ));
        }
        if let Some(index) = self
            .second_moments
            .iter()
            .position(|value| !value.is_finite())
        {
            return Err(WavefrontError::input_validation(
                "INPUT.ELECTRON_BEAM_MOMENTS",
                format!("second-order moment {} is not finite", index),
            ));
        }
        for (index, label) in [
            (moment::XX, "<(x-x0)^2>"),
            (moment::XP_XP, "<(x'-x'0)^2>"),
            (moment::YY, "<(y-y0)^2>"),
            (moment::YP_YP, "<(y'-y'0)^2>"),
            (moment::RELATIVE_ENERGY_SPREAD_SQ, "<(E-E0)^2>/E0^2"),
            (moment::SS, "<(s-s0)^2>"),
        ] {
            if self.second_moments[index] < 0.0 {
                return Err(WavefrontError::input_validation(
                    "INPUT.ELECTRON_BEAM_MOMENTS",
                    format!("second-order moment {} must be non-negative", label),
                ));
            }
        }
        for (size, cross, divergence, plane) in [
            (moment::XX, moment::X_XP, moment::XP_XP, "horizontal"),
            (moment::YY, moment::Y_YP, moment::YP_YP, "vertical"),
        ] {
            let m = &self.second_moments;
            if m[cross] * m[cross] > m[size] * m[divergence] {
                return Err(WavefrontError::input_validation(
                    "INPUT.ELECTRON_BEAM_MOMENTS",
                    format!("{} phase-space moments describe a negative emittance", plane),
                ));
            }
        }
        Ok(())
    }
}

fn plane_emittance(size_sq: f64, cross: f64, divergence_sq: f64) -> f64 {
    (size_sq * divergence_sq - cross * cross).max(0.0).sqrt()
}
