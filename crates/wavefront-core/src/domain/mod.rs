pub mod errors;
mod launch;

pub use errors::{EngineResult, ErrorCategory, WavefrontError, WavefrontResult};
pub use launch::{LaunchContext, LaunchError, ProcessRole};

use num_complex::Complex32;
use serde::{Deserialize, Serialize};

/// Rectangular sampling grid over photon energy, horizontal and vertical position.
///
/// Flattened data on this mesh is C-aligned: energy varies fastest, then the
/// horizontal position, then the vertical position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadMesh {
    pub e_start: f64,
    pub e_fin: f64,
    pub ne: usize,
    pub x_start: f64,
    pub x_fin: f64,
    pub nx: usize,
    pub y_start: f64,
    pub y_fin: f64,
    pub ny: usize,
    /// Longitudinal position of the observation plane [m].
    #[serde(default)]
    pub z_start: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshAxis {
    pub name: &'static str,
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl RadMesh {
    pub const fn new(ne: usize, nx: usize, ny: usize) -> Self {
        Self {
            e_start: 0.0,
            e_fin: 0.0,
            ne,
            x_start: 0.0,
            x_fin: 0.0,
            nx,
            y_start: 0.0,
            y_fin: 0.0,
            ny,
            z_start: 0.0,
        }
    }

    pub const fn with_energy_range(mut self, start: f64, fin: f64) -> Self {
        self.e_start = start;
        self.e_fin = fin;
        self
    }

    pub const fn with_horizontal_range(mut self, start: f64, fin: f64) -> Self {
        self.x_start = start;
        self.x_fin = fin;
        self
    }

    pub const fn with_vertical_range(mut self, start: f64, fin: f64) -> Self {
        self.y_start = start;
        self.y_fin = fin;
        self
    }

    pub const fn at_longitudinal_position(mut self, z: f64) -> Self {
        self.z_start = z;
        self
    }

    /// `ne * nx * ny`, or `None` when the product does not fit in `usize`.
    pub const fn checked_point_count(&self) -> Option<usize> {
        match self.ne.checked_mul(self.nx) {
            Some(count) => count.checked_mul(self.ny),
            None => None,
        }
    }

    /// Saturates at `usize::MAX`; validated meshes never reach it.
    pub const fn point_count(&self) -> usize {
        match self.checked_point_count() {
            Some(count) => count,
            None => usize::MAX,
        }
    }

    pub const fn transverse_point_count(&self) -> usize {
        self.nx.saturating_mul(self.ny)
    }

    pub const fn axes(&self) -> [MeshAxis; 3] {
        [
            MeshAxis {
                name: "photon energy",
                start: self.e_start,
                end: self.e_fin,
                points: self.ne,
            },
            MeshAxis {
                name: "horizontal position",
                start: self.x_start,
                end: self.x_fin,
                points: self.nx,
            },
            MeshAxis {
                name: "vertical position",
                start: self.y_start,
                end: self.y_fin,
                points: self.ny,
            },
        ]
    }

    pub fn validate(&self, label: &str) -> WavefrontResult<()> {
        for axis in self.axes() {
            if !axis.start.is_finite() || !axis.end.is_finite() {
                return Err(WavefrontError::input_validation(
                    "INPUT.MESH_AXIS",
                    format!("mesh '{}' has a non-finite {} range", label, axis.name),
                ));
            }
            if axis.points == 0 {
                return Err(WavefrontError::input_validation(
                    "INPUT.MESH_AXIS",
                    format!("mesh '{}' needs at least one point vs {}", label, axis.name),
                ));
            }
            if axis.points == 1 && axis.start != axis.end {
                return Err(WavefrontError::input_validation(
                    "INPUT.MESH_AXIS",
                    format!(
                        "mesh '{}' has a single point vs {} but start {} differs from end {}",
                        label, axis.name, axis.start, axis.end
                    ),
                ));
            }
        }
        if self.checked_point_count().is_none() {
            return Err(WavefrontError::input_validation(
                "INPUT.MESH_AXIS",
                format!(
                    "mesh '{}' point count {} x {} x {} overflows",
                    label, self.ne, self.nx, self.ny
                ),
            ));
        }
        Ok(())
    }
}

/// Sampled electric field (horizontal and vertical components) on a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricField {
    mesh: RadMesh,
    ex: Vec<Complex32>,
    ey: Vec<Complex32>,
}

impl ElectricField {
    pub fn zeroed(mesh: RadMesh) -> Self {
        let count = mesh.point_count();
        Self {
            mesh,
            ex: vec![Complex32::new(0.0, 0.0); count],
            ey: vec![Complex32::new(0.0, 0.0); count],
        }
    }

    pub fn from_components(
        mesh: RadMesh,
        ex: Vec<Complex32>,
        ey: Vec<Complex32>,
    ) -> WavefrontResult<Self> {
        check_component_lengths(&mesh, ex.len(), ey.len())?;
        Ok(Self { mesh, ex, ey })
    }

    /// Replaces mesh and samples together, e.g. after a resizing propagation step.
    pub fn replace(
        &mut self,
        mesh: RadMesh,
        ex: Vec<Complex32>,
        ey: Vec<Complex32>,
    ) -> WavefrontResult<()> {
        check_component_lengths(&mesh, ex.len(), ey.len())?;
        self.mesh = mesh;
        self.ex = ex;
        self.ey = ey;
        Ok(())
    }

    pub fn mesh(&self) -> &RadMesh {
        &self.mesh
    }

    pub fn ex(&self) -> &[Complex32] {
        &self.ex
    }

    pub fn ey(&self) -> &[Complex32] {
        &self.ey
    }

    pub fn set_longitudinal_position(&mut self, z: f64) {
        self.mesh.z_start = z;
    }
}

fn check_component_lengths(mesh: &RadMesh, ex_len: usize, ey_len: usize) -> WavefrontResult<()> {
    let expected = mesh.point_count();
    if ex_len != expected || ey_len != expected {
        return Err(WavefrontError::input_validation(
            "INPUT.FIELD_LENGTH",
            format!(
                "electric field components have {} and {} samples but the mesh holds {}",
                ex_len, ey_len, expected
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ElectricField, RadMesh};
    use num_complex::Complex32;

    #[test]
    fn point_count_multiplies_all_axes() {
        let mesh = RadMesh::new(4, 3, 2);
        assert_eq!(mesh.point_count(), 24);
        assert_eq!(mesh.transverse_point_count(), 6);
    }

    #[test]
    fn single_point_axis_requires_coincident_bounds() {
        let spectrum = RadMesh::new(10_000, 1, 1).with_energy_range(1000.0, 10_000.0);
        assert!(spectrum.validate("spectrum").is_ok());

        let broken = RadMesh::new(1, 101, 101)
            .with_energy_range(8830.0, 8831.0)
            .with_horizontal_range(-0.0015, 0.0015)
            .with_vertical_range(-0.0006, 0.0006);
        let error = broken.validate("wavefront").expect_err("bounds must coincide");
        assert_eq!(error.placeholder(), "INPUT.MESH_AXIS");
        assert!(error.message().contains("photon energy"));
    }

    #[test]
    fn zero_point_axis_is_rejected() {
        let error = RadMesh::new(1, 0, 1)
            .validate("empty")
            .expect_err("zero points must fail");
        assert!(error.message().contains("horizontal position"));
    }

    #[test]
    fn overflowing_point_count_is_rejected() {
        let huge = RadMesh::new(usize::MAX / 2, 3, 1).with_horizontal_range(-1.0, 1.0);
        assert_eq!(huge.checked_point_count(), None);
        assert_eq!(huge.point_count(), usize::MAX);

        let error = huge.validate("huge").expect_err("point count overflows");
        assert_eq!(error.placeholder(), "INPUT.MESH_AXIS");
        assert!(error.message().contains("overflows"));
    }

    #[test]
    fn field_components_must_match_mesh() {
        let mesh = RadMesh::new(1, 2, 2);
        let error = ElectricField::from_components(
            mesh,
            vec![Complex32::new(1.0, 0.0); 4],
            vec![Complex32::new(0.0, 0.0); 3],
        )
        .expect_err("short ey should fail");
        assert_eq!(error.placeholder(), "INPUT.FIELD_LENGTH");

        let mut field = ElectricField::zeroed(mesh);
        assert_eq!(field.ex().len(), 4);
        field
            .replace(
                RadMesh::new(1, 3, 1),
                vec![Complex32::new(0.5, 0.0); 3],
                vec![Complex32::new(0.0, 0.5); 3],
            )
            .expect("resized field should be accepted");
        assert_eq!(field.mesh().nx, 3);
    }
}
