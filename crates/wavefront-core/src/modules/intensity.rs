//! Selectors for extracting intensity-like quantities from an electric field.

use crate::domain::RadMesh;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarization {
    LinearHorizontal,
    LinearVertical,
    Linear45,
    Linear135,
    CircularRight,
    CircularLeft,
    #[default]
    Total,
}

impl Polarization {
    pub const fn code(self) -> u8 {
        match self {
            Self::LinearHorizontal => 0,
            Self::LinearVertical => 1,
            Self::Linear45 => 2,
            Self::Linear135 => 3,
            Self::CircularRight => 4,
            Self::CircularLeft => 5,
            Self::Total => 6,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::LinearHorizontal,
            1 => Self::LinearVertical,
            2 => Self::Linear45,
            3 => Self::Linear135,
            4 => Self::CircularRight,
            5 => Self::CircularLeft,
            6 => Self::Total,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntensityKind {
    #[default]
    SingleElectron,
    MultiElectron,
    SingleElectronFlux,
    MultiElectronFlux,
    Phase,
    RealField,
    ImaginaryField,
    /// Single-electron intensity integrated over time or photon energy.
    SingleElectronIntegrated,
}

impl IntensityKind {
    pub const fn code(self) -> u8 {
        match self {
            Self::SingleElectron => 0,
            Self::MultiElectron => 1,
            Self::SingleElectronFlux => 2,
            Self::MultiElectronFlux => 3,
            Self::Phase => 4,
            Self::RealField => 5,
            Self::ImaginaryField => 6,
            Self::SingleElectronIntegrated => 7,
        }
    }
}

/// Axes an extracted quantity depends on; the remaining axes are cut at fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dependence {
    Energy,
    Horizontal,
    Vertical,
    HorizontalVertical,
    EnergyHorizontal,
    EnergyVertical,
    EnergyHorizontalVertical,
}

impl Dependence {
    pub const fn code(self) -> u8 {
        match self {
            Self::Energy => 0,
            Self::Horizontal => 1,
            Self::Vertical => 2,
            Self::HorizontalVertical => 3,
            Self::EnergyHorizontal => 4,
            Self::EnergyVertical => 5,
            Self::EnergyHorizontalVertical => 6,
        }
    }

    pub const fn covers_energy(self) -> bool {
        matches!(
            self,
            Self::Energy
                | Self::EnergyHorizontal
                | Self::EnergyVertical
                | Self::EnergyHorizontalVertical
        )
    }

    pub const fn covers_horizontal(self) -> bool {
        matches!(
            self,
            Self::Horizontal
                | Self::HorizontalVertical
                | Self::EnergyHorizontal
                | Self::EnergyHorizontalVertical
        )
    }

    pub const fn covers_vertical(self) -> bool {
        matches!(
            self,
            Self::Vertical
                | Self::HorizontalVertical
                | Self::EnergyVertical
                | Self::EnergyHorizontalVertical
        )
    }

    /// Number of values an extraction with this dependence produces on `mesh`.
    pub const fn output_len(self, mesh: &RadMesh) -> usize {
        match self {
            Self::Energy => mesh.ne,
            Self::Horizontal => mesh.nx,
            Self::Vertical => mesh.ny,
            Self::HorizontalVertical => mesh.transverse_point_count(),
            Self::EnergyHorizontal => mesh.ne.saturating_mul(mesh.nx),
            Self::EnergyVertical => mesh.ne.saturating_mul(mesh.ny),
            Self::EnergyHorizontalVertical => mesh.point_count(),
        }
    }
}

/// Full selector passed to an engine's intensity extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityRequest {
    #[serde(default)]
    pub polarization: Polarization,
    #[serde(default)]
    pub kind: IntensityKind,
    pub dependence: Dependence,
    /// Photon energy of the cut [eV]; the mesh start energy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photon_energy: Option<f64>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl IntensityRequest {
    pub const fn new(dependence: Dependence) -> Self {
        Self {
            polarization: Polarization::Total,
            kind: IntensityKind::SingleElectron,
            dependence,
            photon_energy: None,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn photon_energy_on(&self, mesh: &RadMesh) -> f64 {
        self.photon_energy.unwrap_or(mesh.e_start)
    }

    pub const fn output_len(&self, mesh: &RadMesh) -> usize {
        self.dependence.output_len(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::{Dependence, IntensityKind, IntensityRequest, Polarization};
    use crate::domain::RadMesh;

    #[test]
    fn output_length_follows_dependence() {
        let mesh = RadMesh::new(4, 3, 2);
        assert_eq!(Dependence::Energy.output_len(&mesh), 4);
        assert_eq!(Dependence::Vertical.output_len(&mesh), 2);
        assert_eq!(Dependence::HorizontalVertical.output_len(&mesh), 6);
        assert_eq!(Dependence::EnergyVertical.output_len(&mesh), 8);
        assert_eq!(Dependence::EnergyHorizontalVertical.output_len(&mesh), 24);
    }

    #[test]
    fn coverage_matches_output_axes() {
        assert!(Dependence::Energy.covers_energy());
        assert!(!Dependence::Energy.covers_horizontal());
        assert!(Dependence::HorizontalVertical.covers_vertical());
        assert!(!Dependence::HorizontalVertical.covers_energy());
        assert!(!Dependence::EnergyVertical.covers_horizontal());
        let all = Dependence::EnergyHorizontalVertical;
        assert!(all.covers_energy() && all.covers_horizontal() && all.covers_vertical());
    }

    #[test]
    fn defaults_select_total_single_electron_intensity() {
        let request: IntensityRequest =
            serde_json::from_str(r#"{ "dependence": "horizontal-vertical" }"#)
                .expect("request should parse");
        assert_eq!(request, IntensityRequest::new(Dependence::HorizontalVertical));
        assert_eq!(request.polarization.code(), 6);
        assert_eq!(request.kind, IntensityKind::SingleElectron);
        assert_eq!(request.dependence.code(), 3);

        let mesh = RadMesh::new(1, 5, 5).with_energy_range(8830.0, 8830.0);
        assert_eq!(request.photon_energy_on(&mesh), 8830.0);
    }

    #[test]
    fn polarization_codes_cover_all_components() {
        for code in 0..7 {
            let polarization = Polarization::from_code(code).expect("known code");
            assert_eq!(polarization.code(), code);
        }
        assert_eq!(Polarization::from_code(7), None);
    }
}
