use super::accumulation::{AccumulatedIntensity, CheckpointSink, MultiElectronRequest};
use super::intensity::IntensityRequest;
use super::optics::Beamline;
use super::traits::{FieldRequest, RadiationEngine};
use crate::domain::{ElectricField, EngineResult, LaunchContext, RadMesh, WavefrontError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Exercises the pipeline with zero fields of the right shape.
    DryRun,
    /// Native numerical SR backend.
    Native,
}

impl Display for EngineKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::DryRun => "dry-run",
            Self::Native => "native",
        })
    }
}

pub fn engine_available(kind: EngineKind) -> bool {
    matches!(kind, EngineKind::DryRun)
}

pub fn engine_unavailable_error(kind: EngineKind) -> WavefrontError {
    WavefrontError::computation(
        "RUN.ENGINE_UNAVAILABLE",
        format!(
            "radiation engine '{}' is not linked into this build; use --dry-run to exercise the pipeline",
            kind
        ),
    )
}

pub fn engine_for(kind: EngineKind) -> EngineResult<Box<dyn RadiationEngine>> {
    if !engine_available(kind) {
        return Err(engine_unavailable_error(kind));
    }
    Ok(Box::new(DryRunEngine::new()))
}

/// Engine that produces correctly shaped zero data without any physics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DryRunEngine;

impl DryRunEngine {
    pub const fn new() -> Self {
        Self
    }
}

impl RadiationEngine for DryRunEngine {
    fn compute_field(
        &self,
        _request: &FieldRequest<'_>,
        mesh: RadMesh,
    ) -> EngineResult<ElectricField> {
        mesh.validate("field")?;
        Ok(ElectricField::zeroed(mesh))
    }

    fn extract_intensity(
        &self,
        field: &ElectricField,
        request: &IntensityRequest,
    ) -> EngineResult<Vec<f32>> {
        Ok(vec![0.0; request.output_len(field.mesh())])
    }

    fn propagate(&self, field: &mut ElectricField, beamline: &Beamline) -> EngineResult<()> {
        let z = field.mesh().z_start + beamline.total_drift_length();
        field.set_longitudinal_position(z);
        Ok(())
    }

    fn accumulate_multi_electron(
        &self,
        request: &MultiElectronRequest<'_>,
        launch: &LaunchContext,
        sink: &mut dyn CheckpointSink,
    ) -> EngineResult<Option<AccumulatedIntensity>> {
        let share = launch.macro_electron_share(request.settings.macro_electrons);
        let step = request.settings.macro_electrons_per_checkpoint().max(1);
        let zeros = vec![0.0_f32; request.mesh.point_count()];

        let mut done = 0;
        while done < share {
            done = (done + step).min(share);
            debug!(rank = launch.rank(), done, share, "dry-run checkpoint");
            sink.checkpoint(&zeros, &request.mesh, done)?;
        }

        Ok(launch.role().is_coordinator().then(|| AccumulatedIntensity {
            mesh: request.mesh,
            values: zeros,
            macro_electrons: request.settings.macro_electrons,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{DryRunEngine, EngineKind, engine_available, engine_for};
    use crate::domain::{ErrorCategory, LaunchContext, RadMesh, WavefrontResult};
    use crate::modules::accumulation::{CheckpointSink, MultiElectronConfig, MultiElectronRequest};
    use crate::modules::intensity::{Dependence, IntensityRequest};
    use crate::modules::optics::{Beamline, BeamlineEntry, Drift, OpticalElement, PropagationParams};
    use crate::modules::source::{ElectronBeam, MagneticFieldContainer, SrPrecision};
    use crate::modules::traits::{FieldRequest, RadiationEngine};

    #[derive(Default)]
    struct RecordingSink {
        counts: Vec<usize>,
    }

    impl CheckpointSink for RecordingSink {
        fn checkpoint(
            &mut self,
            intensity: &[f32],
            mesh: &RadMesh,
            macro_electrons_done: usize,
        ) -> WavefrontResult<()> {
            assert_eq!(intensity.len(), mesh.point_count());
            self.counts.push(macro_electrons_done);
            Ok(())
        }
    }

    #[test]
    fn native_engine_is_reported_unavailable() {
        assert!(engine_available(EngineKind::DryRun));
        assert!(!engine_available(EngineKind::Native));
        let error = engine_for(EngineKind::Native).err().expect("native is not linked");
        assert_eq!(error.placeholder(), "RUN.ENGINE_UNAVAILABLE");
        assert_eq!(error.category(), ErrorCategory::ComputationError);
        assert!(engine_for(EngineKind::DryRun).is_ok());
    }

    #[test]
    fn dry_run_shapes_follow_requested_mesh() {
        let beam = ElectronBeam::new(0.1, 13_698.8);
        let field = MagneticFieldContainer { elements: Vec::new() };
        let request = FieldRequest {
            beam: &beam,
            field: &field,
            precision: SrPrecision::default(),
        };
        let mesh = RadMesh::new(1, 5, 3).with_energy_range(8830.0, 8830.0);
        let mut wavefront = DryRunEngine
            .compute_field(&request, mesh.at_longitudinal_position(37.5))
            .expect("dry-run field");
        let intensity = DryRunEngine
            .extract_intensity(&wavefront, &IntensityRequest::new(Dependence::HorizontalVertical))
            .expect("dry-run intensity");
        assert_eq!(intensity.len(), 15);

        let beamline = Beamline::new(vec![BeamlineEntry::new(
            OpticalElement::Drift(Drift { length: 2.5 }),
            PropagationParams::default(),
        )]);
        DryRunEngine
            .propagate(&mut wavefront, &beamline)
            .expect("dry-run propagation");
        assert_eq!(wavefront.mesh().z_start, 40.0);
    }

    #[test]
    fn dry_run_checkpoints_at_configured_cadence() {
        let beam = ElectronBeam::new(0.1, 13_698.8);
        let field = MagneticFieldContainer { elements: Vec::new() };
        let settings = MultiElectronConfig {
            macro_electrons: 25,
            averaging_per_process: 2,
            checkpoint_period: 5,
            ..MultiElectronConfig::default()
        };
        let request = MultiElectronRequest {
            beam: &beam,
            field: &field,
            mesh: RadMesh::new(1, 2, 2),
            settings: &settings,
            beamline: None,
        };

        let mut sink = RecordingSink::default();
        let result = DryRunEngine
            .accumulate_multi_electron(&request, &LaunchContext::single_process(), &mut sink)
            .expect("dry-run accumulation");
        assert_eq!(sink.counts, vec![10, 20, 25]);
        let result = result.expect("coordinator holds the result");
        assert_eq!(result.values.len(), 4);
        assert_eq!(result.macro_electrons, 25);

        let worker = LaunchContext::new(1, 2).expect("valid launch");
        let mut sink = RecordingSink::default();
        let result = DryRunEngine
            .accumulate_multi_electron(&request, &worker, &mut sink)
            .expect("worker accumulation");
        assert!(result.is_none());
        assert_eq!(sink.counts, vec![10, 12]);
    }
}
