use super::TransmissionRecord;
use crate::common::is_positive_finite;
use crate::domain::{RadMesh, WavefrontError, WavefrontResult};
use serde::{Deserialize, Serialize};

/// Focal length reported for a plane in which an element does not focus [m].
pub const NON_FOCUSING_LENGTH: f64 = 1.0e23;

const DEFAULT_GRID_POINTS: usize = 1001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusingPlane {
    Horizontal,
    Vertical,
    Both,
}

impl FocusingPlane {
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Horizontal),
            2 => Some(Self::Vertical),
            3 => Some(Self::Both),
            _ => None,
        }
    }

    const fn focuses_horizontally(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    const fn focuses_vertically(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LensProfile {
    Parabolic,
    Circular,
}

impl LensProfile {
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Parabolic),
            2 => Some(Self::Circular),
            _ => None,
        }
    }
}

fn default_grid_points() -> usize {
    DEFAULT_GRID_POINTS
}

/// Physical description of a compound refractive lens made of `lens_count` identical holes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrlSpec {
    pub focusing_plane: FocusingPlane,
    pub profile: LensProfile,
    /// Refractive index decrement at the design photon energy.
    pub delta: f64,
    /// Intensity attenuation length of the lens material [m].
    pub attenuation_length: f64,
    /// Geometrical aperture in the horizontal plane [m].
    pub aperture_h: f64,
    /// Geometrical aperture in the vertical plane [m].
    pub aperture_v: f64,
    /// Radius at the tip of the parabola (or of the circle) [m].
    pub tip_radius: f64,
    pub lens_count: u32,
    /// Minimal wall thickness between holes [m].
    pub wall_thickness: f64,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
    #[serde(default)]
    pub energy_range: [f64; 2],
    #[serde(default = "default_grid_points")]
    pub nx: usize,
    #[serde(default = "default_grid_points")]
    pub ny: usize,
}

impl CrlSpec {
    pub fn validate(&self) -> WavefrontResult<()> {
        for (value, label) in [
            (self.delta, "refractive index decrement"),
            (self.attenuation_length, "attenuation length"),
            (self.aperture_h, "horizontal aperture"),
            (self.aperture_v, "vertical aperture"),
            (self.tip_radius, "tip radius"),
        ] {
            if !is_positive_finite(value) {
                return Err(WavefrontError::input_validation(
                    "INPUT.CRL_PARAMETER",
                    format!("CRL {} must be positive, got {}", label, value),
                ));
            }
        }
        if !self.wall_thickness.is_finite() || self.wall_thickness < 0.0 {
            return Err(WavefrontError::input_validation(
                "INPUT.CRL_PARAMETER",
                format!(
                    "CRL wall thickness must be non-negative, got {}",
                    self.wall_thickness
                ),
            ));
        }
        if self.lens_count == 0 {
            return Err(WavefrontError::input_validation(
                "INPUT.CRL_PARAMETER",
                "CRL needs at least one lens",
            ));
        }
        if self.nx == 0 || self.ny == 0 {
            return Err(WavefrontError::input_validation(
                "INPUT.CRL_GRID",
                format!(
                    "CRL transmission grid needs points, got {} x {}",
                    self.nx, self.ny
                ),
            ));
        }
        if self
            .nx
            .checked_mul(self.ny)
            .and_then(|cells| cells.checked_mul(2))
            .is_none()
        {
            return Err(WavefrontError::input_validation(
                "INPUT.CRL_GRID",
                format!(
                    "CRL transmission grid {} x {} overflows",
                    self.nx, self.ny
                ),
            ));
        }
        if !self.center_x.is_finite() || !self.center_y.is_finite() {
            return Err(WavefrontError::input_validation(
                "INPUT.CRL_PARAMETER",
                "CRL centre has a non-finite coordinate",
            ));
        }
        Ok(())
    }

    /// Thin-lens focal length `R / (2 N delta)`.
    pub fn focal_length(&self) -> f64 {
        self.tip_radius / (2.0 * f64::from(self.lens_count) * self.delta)
    }

    pub fn focal_lengths(&self) -> [f64; 2] {
        let focal = self.focal_length();
        [
            if self.focusing_plane.focuses_horizontally() {
                focal
            } else {
                NON_FOCUSING_LENGTH
            },
            if self.focusing_plane.focuses_vertically() {
                focal
            } else {
                NON_FOCUSING_LENGTH
            },
        ]
    }

    pub fn mesh(&self) -> RadMesh {
        let half_h = 0.5 * self.aperture_h;
        let half_v = 0.5 * self.aperture_v;
        let (x_start, x_fin) = axis_bounds(self.center_x, half_h, self.nx);
        let (y_start, y_fin) = axis_bounds(self.center_y, half_v, self.ny);
        RadMesh::new(1, self.nx, self.ny)
            .with_energy_range(self.energy_range[0], self.energy_range[1])
            .with_horizontal_range(x_start, x_fin)
            .with_vertical_range(y_start, y_fin)
    }

    /// Squared radius beyond which the lens profile stops growing.
    fn max_radius_sq(&self) -> f64 {
        let half_h = 0.5 * self.aperture_h;
        let half_v = 0.5 * self.aperture_v;
        let half = match self.focusing_plane {
            FocusingPlane::Horizontal => half_h,
            FocusingPlane::Vertical => half_v,
            FocusingPlane::Both => half_h.min(half_v),
        };
        let limit = half * half;
        match self.profile {
            LensProfile::Parabolic => limit,
            LensProfile::Circular => limit.min(self.tip_radius * self.tip_radius),
        }
    }

    /// Material thickness crossed by a ray at offset `(dx, dy)` from the lens axis.
    pub fn path_in_material(&self, dx: f64, dy: f64) -> f64 {
        let mut radius_sq = 0.0;
        if self.focusing_plane.focuses_horizontally() {
            radius_sq += dx * dx;
        }
        if self.focusing_plane.focuses_vertically() {
            radius_sq += dy * dy;
        }
        let radius_sq = radius_sq.min(self.max_radius_sq());

        let per_lens = match self.profile {
            LensProfile::Parabolic => radius_sq / self.tip_radius,
            LensProfile::Circular => {
                2.0 * (self.tip_radius - (self.tip_radius * self.tip_radius - radius_sq).sqrt())
            }
        };
        f64::from(self.lens_count) * (self.wall_thickness + per_lens)
    }

    /// Tabulates amplitude transmission and optical path difference over the aperture.
    pub fn build_transmission(&self) -> WavefrontResult<TransmissionRecord> {
        self.validate()?;
        let mesh = self.mesh();
        let x_step = axis_step(mesh.x_start, mesh.x_fin, mesh.nx);
        let y_step = axis_step(mesh.y_start, mesh.y_fin, mesh.ny);

        let mut data = Vec::with_capacity(2 * mesh.nx * mesh.ny);
        for iy in 0..mesh.ny {
            let dy = mesh.y_start + iy as f64 * y_step - self.center_y;
            for ix in 0..mesh.nx {
                let dx = mesh.x_start + ix as f64 * x_step - self.center_x;
                let path = self.path_in_material(dx, dy);
                data.push((-0.5 * path / self.attenuation_length).exp());
                data.push(-self.delta * path);
            }
        }

        let [fx, fy] = self.focal_lengths();
        Ok(TransmissionRecord::new(mesh, data)?.with_focal_lengths(fx, fy))
    }
}

fn axis_bounds(center: f64, half: f64, points: usize) -> (f64, f64) {
    if points > 1 {
        (center - half, center + half)
    } else {
        (center, center)
    }
}

fn axis_step(start: f64, fin: f64, points: usize) -> f64 {
    if points > 1 {
        (fin - start) / (points - 1) as f64
    } else {
        0.0
    }
}
