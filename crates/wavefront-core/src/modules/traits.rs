use crate::domain::{ElectricField, EngineResult, LaunchContext, RadMesh};
use crate::modules::accumulation::{AccumulatedIntensity, CheckpointSink, MultiElectronRequest};
use crate::modules::intensity::IntensityRequest;
use crate::modules::optics::Beamline;
use crate::modules::source::{ElectronBeam, MagneticFieldContainer, SrPrecision};
use crate::modules::transmission::{CrlSpec, TransmissionRecord};

/// Source description for a single-electron field calculation.
#[derive(Debug, Clone, Copy)]
pub struct FieldRequest<'a> {
    pub beam: &'a ElectronBeam,
    pub field: &'a MagneticFieldContainer,
    pub precision: SrPrecision,
}

/// Numerical backend computing, propagating and accumulating synchrotron radiation.
pub trait RadiationEngine {
    fn compute_field(&self, request: &FieldRequest<'_>, mesh: RadMesh)
    -> EngineResult<ElectricField>;

    fn extract_intensity(
        &self,
        field: &ElectricField,
        request: &IntensityRequest,
    ) -> EngineResult<Vec<f32>>;

    /// Propagates `field` through `beamline`, updating its mesh in place.
    fn propagate(&self, field: &mut ElectricField, beamline: &Beamline) -> EngineResult<()>;

    fn setup_crl(&self, crl: &CrlSpec) -> EngineResult<TransmissionRecord> {
        crl.build_transmission()
    }

    /// Runs this process's share of the accumulation. Returns the combined
    /// intensity only on the process that holds it.
    fn accumulate_multi_electron(
        &self,
        request: &MultiElectronRequest<'_>,
        launch: &LaunchContext,
        sink: &mut dyn CheckpointSink,
    ) -> EngineResult<Option<AccumulatedIntensity>>;
}

impl<T> RadiationEngine for &T
where
    T: RadiationEngine + ?Sized,
{
    fn compute_field(
        &self,
        request: &FieldRequest<'_>,
        mesh: RadMesh,
    ) -> EngineResult<ElectricField> {
        (**self).compute_field(request, mesh)
    }

    fn extract_intensity(
        &self,
        field: &ElectricField,
        request: &IntensityRequest,
    ) -> EngineResult<Vec<f32>> {
        (**self).extract_intensity(field, request)
    }

    fn propagate(&self, field: &mut ElectricField, beamline: &Beamline) -> EngineResult<()> {
        (**self).propagate(field, beamline)
    }

    fn setup_crl(&self, crl: &CrlSpec) -> EngineResult<TransmissionRecord> {
        (**self).setup_crl(crl)
    }

    fn accumulate_multi_electron(
        &self,
        request: &MultiElectronRequest<'_>,
        launch: &LaunchContext,
        sink: &mut dyn CheckpointSink,
    ) -> EngineResult<Option<AccumulatedIntensity>> {
        (**self).accumulate_multi_electron(request, launch, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldRequest, RadiationEngine};
    use crate::domain::{
        ElectricField, EngineResult, ErrorCategory, LaunchContext, RadMesh, WavefrontError,
    };
    use crate::modules::accumulation::{
        AccumulatedIntensity, CheckpointSink, MultiElectronRequest,
    };
    use crate::modules::intensity::IntensityRequest;
    use crate::modules::optics::Beamline;
    use crate::modules::source::{ElectronBeam, MagneticFieldContainer, SrPrecision};
    use crate::modules::transmission::{CrlSpec, FocusingPlane, LensProfile};

    struct FailingEngine;

    impl RadiationEngine for FailingEngine {
        fn compute_field(
            &self,
            _request: &FieldRequest<'_>,
            _mesh: RadMesh,
        ) -> EngineResult<ElectricField> {
            Err(WavefrontError::computation(
                "RUN.FIELD",
                "field calculation failed",
            ))
        }

        fn extract_intensity(
            &self,
            _field: &ElectricField,
            _request: &IntensityRequest,
        ) -> EngineResult<Vec<f32>> {
            Ok(Vec::new())
        }

        fn propagate(&self, _field: &mut ElectricField, _beamline: &Beamline) -> EngineResult<()> {
            Ok(())
        }

        fn accumulate_multi_electron(
            &self,
            _request: &MultiElectronRequest<'_>,
            _launch: &LaunchContext,
            _sink: &mut dyn CheckpointSink,
        ) -> EngineResult<Option<AccumulatedIntensity>> {
            Ok(None)
        }
    }

    #[test]
    fn engine_errors_use_shared_error_types() {
        let beam = ElectronBeam::new(0.1, 13_698.8);
        let field = MagneticFieldContainer { elements: Vec::new() };
        let request = FieldRequest {
            beam: &beam,
            field: &field,
            precision: SrPrecision::default(),
        };
        let error = FailingEngine
            .compute_field(&request, RadMesh::new(1, 1, 1))
            .expect_err("engine should fail");
        assert_eq!(error.category(), ErrorCategory::ComputationError);
        assert_eq!(error.exit_code(), 4);
        assert_eq!(error.placeholder(), "RUN.FIELD");
    }

    #[test]
    fn crl_setup_defaults_to_native_geometry() {
        let crl = CrlSpec {
            focusing_plane: FocusingPlane::Both,
            profile: LensProfile::Parabolic,
            delta: 4.3712962e-06,
            attenuation_length: 6946.13e-06,
            aperture_h: 1.0e-03,
            aperture_v: 1.0e-03,
            tip_radius: 0.5e-03,
            lens_count: 1,
            wall_thickness: 0.0,
            center_x: 0.0,
            center_y: 0.0,
            energy_range: [0.0, 0.0],
            nx: 3,
            ny: 3,
        };
        let record = FailingEngine.setup_crl(&crl).expect("geometry needs no engine");
        assert_eq!(record.cell_count(), 9);
        let [fx, fy] = record.focal_lengths();
        assert_eq!(fx, fy);
    }
}
