//! Run configuration: source, meshes, beamline, accumulation and output naming.
//!
//! A configuration is built once (from [`RunConfig::reference`] or a JSON
//! document) and then only read while a run proceeds.

use super::constants::{
    CRL_PATH_DIFFERENCE_FILE, CRL_TRANSMISSION_FILE, DEFAULT_OUTPUT_DIR, ELECTRON_REST_ENERGY_GEV,
    INITIAL_INTENSITY_FILE, PARTIALLY_COHERENT_FILE, PROPAGATED_INTENSITY_FILE,
    SPECTRUM_INTENSITY_FILE, TRAJECTORY_FILE,
};
use crate::domain::{RadMesh, WavefrontError, WavefrontResult};
use crate::modules::accumulation::MultiElectronConfig;
use crate::modules::intensity::{Dependence, IntensityRequest};
use crate::modules::optics::{
    Aperture, BeamlineEntrySpec, BeamlineSpec, Drift, ElementSpec, PropagationParams,
};
use crate::modules::source::{
    ElectronBeam, FieldPlane, MagneticFieldContainer, SrPrecision, Undulator, UndulatorHarmonic,
};
use crate::modules::transmission::{CrlSpec, FocusingPlane, LensProfile, TransmissionMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Observation plane of the reference run, measured from the straight-section centre [m].
const REFERENCE_OBSERVATION_Z: f64 = 36.25 + 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensitySelection {
    /// Extraction applied to the on-axis spectrum.
    pub spectrum: IntensityRequest,
    /// Extraction applied to the fixed-energy wavefront before and after propagation.
    pub wavefront: IntensityRequest,
}

impl IntensitySelection {
    /// Every selector must yield one value per cell of the table it is written to.
    /// Wavefront meshes may be resized by sampling and propagation, so the
    /// wavefront selector always has to span both transverse axes.
    fn validate(
        &self,
        spectrum_mesh: &RadMesh,
        wavefront_mesh: &RadMesh,
    ) -> WavefrontResult<()> {
        let spectrum = self.spectrum.dependence;
        let wavefront = self.wavefront.dependence;
        let axes = [
            ("spectrum", "photon energy", spectrum_mesh.ne > 1, spectrum.covers_energy()),
            ("spectrum", "horizontal position", spectrum_mesh.nx > 1, spectrum.covers_horizontal()),
            ("spectrum", "vertical position", spectrum_mesh.ny > 1, spectrum.covers_vertical()),
            ("wavefront", "photon energy", wavefront_mesh.ne > 1, wavefront.covers_energy()),
            ("wavefront", "horizontal position", true, wavefront.covers_horizontal()),
            ("wavefront", "vertical position", true, wavefront.covers_vertical()),
        ];
        for (selector, axis, required, covered) in axes {
            if required && !covered {
                return Err(WavefrontError::input_validation(
                    "INPUT.INTENSITY_SELECTION",
                    format!(
                        "{} intensity selector must depend on {} to fill its mesh",
                        selector, axis
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl Default for IntensitySelection {
    fn default() -> Self {
        Self {
            spectrum: IntensityRequest::new(Dependence::Energy),
            wavefront: IntensityRequest::new(Dependence::HorizontalVertical),
        }
    }
}

/// One transmission table exported while the beamline is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionExport {
    /// Position among the beamline's transmission elements.
    #[serde(default)]
    pub element: usize,
    pub mode: TransmissionMode,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Reserved for electron trajectory output; no stage writes it.
    pub trajectory_file: String,
    pub spectrum_file: String,
    pub initial_wavefront_file: String,
    pub propagated_wavefront_file: String,
    pub partially_coherent_file: String,
    #[serde(default)]
    pub transmission_exports: Vec<TransmissionExport>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            trajectory_file: TRAJECTORY_FILE.to_string(),
            spectrum_file: SPECTRUM_INTENSITY_FILE.to_string(),
            initial_wavefront_file: INITIAL_INTENSITY_FILE.to_string(),
            propagated_wavefront_file: PROPAGATED_INTENSITY_FILE.to_string(),
            partially_coherent_file: PARTIALLY_COHERENT_FILE.to_string(),
            transmission_exports: vec![
                TransmissionExport {
                    element: 0,
                    mode: TransmissionMode::Intensity,
                    file: CRL_TRANSMISSION_FILE.to_string(),
                },
                TransmissionExport {
                    element: 0,
                    mode: TransmissionMode::PathDifference,
                    file: CRL_PATH_DIFFERENCE_FILE.to_string(),
                },
            ],
        }
    }
}

impl OutputConfig {
    fn file_names(&self) -> impl Iterator<Item = &str> + '_ {
        [
            self.trajectory_file.as_str(),
            self.spectrum_file.as_str(),
            self.initial_wavefront_file.as_str(),
            self.propagated_wavefront_file.as_str(),
            self.partially_coherent_file.as_str(),
        ]
        .into_iter()
        .chain(
            self.transmission_exports
                .iter()
                .map(|export| export.file.as_str()),
        )
    }

    fn validate(&self, transmission_elements: usize) -> WavefrontResult<()> {
        for name in self.file_names() {
            let path = Path::new(name);
            if name.trim().is_empty() || path.file_name() != Some(path.as_os_str()) {
                return Err(WavefrontError::input_validation(
                    "INPUT.OUTPUT_FILE",
                    format!(
                        "output file name '{}' must be a plain file name inside the output directory",
                        name
                    ),
                ));
            }
        }
        if let Some(export) = self
            .transmission_exports
            .iter()
            .find(|export| export.element >= transmission_elements)
        {
            return Err(WavefrontError::input_validation(
                "INPUT.TRANSMISSION_EXPORT",
                format!(
                    "transmission export '{}' refers to element {} but the beamline has {} transmission element(s)",
                    export.file, export.element, transmission_elements
                ),
            ));
        }
        Ok(())
    }
}

/// Quantities derived from the source for run summaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceSummary {
    pub electron_energy_gev: f64,
    pub deflection_parameter: f64,
    pub fundamental_photon_energy_ev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub field: MagneticFieldContainer,
    pub electron_beam: ElectronBeam,
    pub precision: SrPrecision,
    pub spectrum_mesh: RadMesh,
    pub wavefront_mesh: RadMesh,
    pub beamline: BeamlineSpec,
    #[serde(default)]
    pub intensity: IntensitySelection,
    pub accumulation: MultiElectronConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl RunConfig {
    /// Planar undulator on a 7 GeV ring imaged through a 1D beryllium CRL.
    pub fn reference() -> Self {
        let undulator = Undulator {
            harmonics: vec![
                UndulatorHarmonic::new(1, FieldPlane::Vertical, 0.3545, 0.0, -1),
                UndulatorHarmonic::new(1, FieldPlane::Horizontal, 0.0, 0.0, 1),
            ],
            period: 0.033,
            periods: 72.5,
        };

        let electron_beam = ElectronBeam::new(0.1, 7.0 / ELECTRON_REST_ENERGY_GEV)
            .with_horizontal_rms(118.027e-06, 27.3666e-06)
            .with_vertical_rms(15.4091e-06, 2.90738e-06)
            .with_relative_energy_spread(1.0e-03);

        let precision = SrPrecision {
            sampling_factor: 0.25,
            ..SrPrecision::default()
        };

        let spectrum_mesh = RadMesh::new(10_000, 1, 1)
            .with_energy_range(1000.0, 10_000.0)
            .at_longitudinal_position(REFERENCE_OBSERVATION_Z);
        let wavefront_mesh = RadMesh::new(1, 101, 101)
            .with_energy_range(8830.0, 8830.0)
            .with_horizontal_range(-0.0015, 0.0015)
            .with_vertical_range(-0.0006, 0.0006)
            .at_longitudinal_position(REFERENCE_OBSERVATION_Z);

        // Focusing aperture 1 mm (vertical), non-focusing 3 mm (horizontal).
        let crl = CrlSpec {
            focusing_plane: FocusingPlane::Vertical,
            profile: LensProfile::Parabolic,
            delta: 4.3712962e-06,
            attenuation_length: 6946.13e-06,
            aperture_h: 3.0e-03,
            aperture_v: 1.0e-03,
            tip_radius: 0.5e-03,
            lens_count: 3,
            wall_thickness: 50.0e-06,
            center_x: 0.0,
            center_y: 0.0,
            energy_range: [0.0, 0.0],
            nx: 1001,
            ny: 1001,
        };

        let beamline = BeamlineSpec::new(vec![
            BeamlineEntrySpec::new(
                ElementSpec::Aperture(Aperture::rectangular(3.0e-03, 1.0e-03)),
                PropagationParams {
                    horizontal_range_factor: 1.5,
                    vertical_range_factor: 1.1,
                    vertical_resolution_factor: 8.0,
                    ..PropagationParams::default()
                },
            ),
            BeamlineEntrySpec::new(ElementSpec::Crl(crl), PropagationParams::default()),
            BeamlineEntrySpec::new(
                ElementSpec::Drift(Drift { length: 38.73 }),
                PropagationParams {
                    semi_analytical_phase: true,
                    horizontal_resolution_factor: 1.2,
                    ..PropagationParams::default()
                },
            ),
        ]);

        Self {
            field: MagneticFieldContainer::single(undulator, [0.0, 0.0, 1.25]),
            electron_beam,
            precision,
            spectrum_mesh,
            wavefront_mesh,
            beamline,
            intensity: IntensitySelection::default(),
            accumulation: MultiElectronConfig::default(),
            output: OutputConfig::default(),
        }
    }

    pub fn validate(&self) -> WavefrontResult<()> {
        self.field.validate()?;
        self.electron_beam.validate()?;
        self.precision.validate()?;
        self.spectrum_mesh.validate("spectrum")?;
        self.wavefront_mesh.validate("wavefront")?;
        self.beamline.validate()?;
        self.accumulation.validate()?;
        self.intensity
            .validate(&self.spectrum_mesh, &self.wavefront_mesh)?;
        let transmission_elements = self
            .beamline
            .entries
            .iter()
            .filter(|entry| matches!(entry.element, ElementSpec::Crl(_)))
            .count();
        self.output.validate(transmission_elements)
    }

    pub fn from_json_str(content: &str) -> WavefrontResult<Self> {
        let config: Self = serde_json::from_str(content).map_err(|source| {
            WavefrontError::input_validation(
                "INPUT.CONFIG_PARSE",
                format!("failed to parse run configuration: {}", source),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> WavefrontResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| {
            WavefrontError::io_system(
                "IO.CONFIG_READ",
                format!(
                    "failed to read run configuration '{}': {}",
                    path.display(),
                    source
                ),
            )
        })?;
        Self::from_json_str(&content).map_err(|error| {
            WavefrontError::new(
                error.category(),
                error.placeholder(),
                format!("{} ({})", error.message(), path.display()),
            )
        })
    }

    pub fn to_json_pretty(&self) -> WavefrontResult<String> {
        serde_json::to_string_pretty(self).map_err(|source| {
            WavefrontError::internal(
                "SYS.CONFIG_SERIALIZE",
                format!("failed to serialize run configuration: {}", source),
            )
        })
    }

    pub fn save(&self, path: &Path) -> WavefrontResult<()> {
        let mut content = self.to_json_pretty()?;
        content.push('\n');
        fs::write(path, content).map_err(|source| {
            WavefrontError::io_system(
                "IO.CONFIG_WRITE",
                format!(
                    "failed to write run configuration '{}': {}",
                    path.display(),
                    source
                ),
            )
        })
    }

    pub fn source_summary(&self) -> SourceSummary {
        let gamma = self.electron_beam.first_moments.gamma;
        let (deflection_parameter, fundamental_photon_energy_ev) =
            match self.field.primary_undulator() {
                Some(undulator) => (
                    undulator.deflection_parameter(),
                    undulator.fundamental_photon_energy(gamma),
                ),
                None => (0.0, 0.0),
            };
        SourceSummary {
            electron_energy_gev: self.electron_beam.energy_gev(),
            deflection_parameter,
            fundamental_photon_energy_ev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputConfig, RunConfig, TransmissionExport};
    use crate::modules::intensity::{Dependence, IntensityRequest};
    use crate::modules::transmission::TransmissionMode;
    use tempfile::TempDir;

    #[test]
    fn reference_configuration_is_valid() {
        let config = RunConfig::reference();
        config.validate().expect("reference should validate");
        assert_eq!(config.spectrum_mesh.ne, 10_000);
        assert_eq!(config.wavefront_mesh.point_count(), 101 * 101);
        assert_eq!(config.beamline.entries.len(), 3);
        assert_eq!(config.accumulation.macro_electrons, 50_000);
        assert_eq!(config.output.transmission_exports.len(), 2);
    }

    #[test]
    fn source_summary_reports_derived_quantities() {
        let summary = RunConfig::reference().source_summary();
        assert!((summary.electron_energy_gev - 7.0).abs() < 1.0e-12);
        assert!((summary.deflection_parameter - 1.0923).abs() < 1.0e-3);
        assert!(
            (summary.fundamental_photon_energy_ev - 8830.0).abs() < 10.0,
            "E1 was {}",
            summary.fundamental_photon_energy_ev
        );
    }

    #[test]
    fn json_round_trip_through_file_preserves_configuration() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("run.json");
        let config = RunConfig::reference();
        config.save(&path).expect("config should save");

        let loaded = RunConfig::load(&path).expect("config should load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn export_of_missing_transmission_element_is_rejected() {
        let mut config = RunConfig::reference();
        config.output.transmission_exports.push(TransmissionExport {
            element: 1,
            mode: TransmissionMode::Amplitude,
            file: "second.dat".to_string(),
        });
        let error = config.validate().expect_err("only one CRL");
        assert_eq!(error.placeholder(), "INPUT.TRANSMISSION_EXPORT");
    }

    #[test]
    fn selectors_must_cover_every_sampled_axis() {
        let mut config = RunConfig::reference();
        config.wavefront_mesh.ne = 2;
        config.wavefront_mesh.e_fin = 8840.0;
        let error = config.validate().expect_err("wavefront varies in energy");
        assert_eq!(error.placeholder(), "INPUT.INTENSITY_SELECTION");
        assert!(error.message().contains("photon energy"));

        config.intensity.wavefront = IntensityRequest::new(Dependence::EnergyHorizontalVertical);
        config.validate().expect("full dependence fills the mesh");

        let mut config = RunConfig::reference();
        config.intensity.wavefront = IntensityRequest::new(Dependence::Horizontal);
        let error = config.validate().expect_err("vertical axis missing");
        assert!(error.message().contains("vertical position"));

        let mut config = RunConfig::reference();
        config.spectrum_mesh = config.spectrum_mesh.with_horizontal_range(-0.001, 0.001);
        config.spectrum_mesh.nx = 3;
        let error = config.validate().expect_err("spectrum spans x");
        assert_eq!(error.placeholder(), "INPUT.INTENSITY_SELECTION");
        assert!(error.message().starts_with("spectrum"));
    }

    #[test]
    fn output_names_must_stay_inside_directory() {
        let mut config = RunConfig::reference();
        config.output = OutputConfig {
            spectrum_file: "../escape.dat".to_string(),
            ..OutputConfig::default()
        };
        let error = config.validate().expect_err("nested path");
        assert_eq!(error.placeholder(), "INPUT.OUTPUT_FILE");
    }

    #[test]
    fn malformed_and_missing_files_map_to_categories() {
        let temp = TempDir::new().expect("tempdir should be created");
        let missing = RunConfig::load(&temp.path().join("absent.json")).expect_err("missing file");
        assert_eq!(missing.placeholder(), "IO.CONFIG_READ");
        assert_eq!(missing.exit_code(), 3);

        let error = RunConfig::from_json_str("{ \"field\": 1 }").expect_err("bad document");
        assert_eq!(error.placeholder(), "INPUT.CONFIG_PARSE");
        assert_eq!(error.exit_code(), 2);
    }
}
