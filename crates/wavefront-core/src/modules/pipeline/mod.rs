//! Run orchestration: beamline assembly, single-electron stage on the
//! coordinator, and multi-electron accumulation on every process.

mod checkpoint;
mod layout;

pub use checkpoint::CheckpointWriter;
pub use layout::OutputLayout;

use crate::common::config::RunConfig;
use crate::domain::{LaunchContext, ProcessRole, RadMesh, WavefrontError, WavefrontResult};
use crate::modules::accumulation::{CheckpointSink, MultiElectronRequest};
use crate::modules::optics::Beamline;
use crate::modules::serialization::{write_intensity_table, write_transmission_table};
use crate::modules::traits::{FieldRequest, RadiationEngine};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span};

/// What one process did during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub role: ProcessRole,
    pub transmission_files: Vec<PathBuf>,
    pub intensity_files: Vec<PathBuf>,
    /// Mesh of the wavefront after propagation (coordinator only).
    pub propagated_mesh: Option<RadMesh>,
    pub checkpoints_written: usize,
    pub checkpoints_discarded: usize,
    /// Macro-electrons reflected in the accumulated result held by this process.
    pub accumulated_macro_electrons: Option<usize>,
}

impl PipelineReport {
    fn new(role: ProcessRole) -> Self {
        Self {
            role,
            transmission_files: Vec::new(),
            intensity_files: Vec::new(),
            propagated_mesh: None,
            checkpoints_written: 0,
            checkpoints_discarded: 0,
            accumulated_macro_electrons: None,
        }
    }

    pub fn files_written(&self) -> impl Iterator<Item = &PathBuf> + '_ {
        self.transmission_files
            .iter()
            .chain(self.intensity_files.iter())
    }
}

/// Runs the whole sequence for this process. Engine errors are returned unchanged.
pub fn run_pipeline<E>(
    config: &RunConfig,
    engine: &E,
    launch: &LaunchContext,
    layout: &OutputLayout,
) -> WavefrontResult<PipelineReport>
where
    E: RadiationEngine + ?Sized,
{
    let role = launch.role();
    let span = info_span!("pipeline", rank = launch.rank(), size = launch.size(), %role);
    let _entered = span.enter();

    config.validate()?;
    // Accumulation starts from the configured mesh, whatever propagation does to the wavefront.
    let initial_mesh = config.wavefront_mesh;
    layout.ensure_root()?;

    let mut report = PipelineReport::new(role);

    info!(elements = config.beamline.entries.len(), "assembling beamline");
    let beamline = config.beamline.assemble(engine)?;
    report.transmission_files = write_transmission_exports(config, &beamline, layout)?;

    if role.is_coordinator() {
        run_single_electron(config, engine, &beamline, layout, &mut report)?;
    } else {
        info!("single-electron stage runs on the coordinator only");
    }

    info!(
        macro_electrons = config.accumulation.macro_electrons,
        share = launch.macro_electron_share(config.accumulation.macro_electrons),
        "starting multi-electron accumulation"
    );
    let request = MultiElectronRequest {
        beam: &config.electron_beam,
        field: &config.field,
        mesh: initial_mesh,
        settings: &config.accumulation,
        beamline: config.accumulation.propagate.then_some(&beamline),
    };
    let mut sink = CheckpointWriter::new(layout.partially_coherent(), role);
    let accumulated = engine.accumulate_multi_electron(&request, launch, &mut sink)?;

    if let Some(result) = accumulated {
        report.accumulated_macro_electrons = Some(result.macro_electrons);
        sink.checkpoint(&result.values, &result.mesh, result.macro_electrons)?;
    }
    report.checkpoints_written = sink.written();
    report.checkpoints_discarded = sink.discarded();
    if sink.written() > 0 {
        report.intensity_files.push(sink.path().to_path_buf());
    }

    info!(
        checkpoints = report.checkpoints_written,
        files = report.files_written().count(),
        "run finished"
    );
    Ok(report)
}

/// Writes every configured transmission table of an assembled beamline.
pub fn write_transmission_exports(
    config: &RunConfig,
    beamline: &Beamline,
    layout: &OutputLayout,
) -> WavefrontResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(config.output.transmission_exports.len());
    for export in &config.output.transmission_exports {
        let record = beamline.transmissions().nth(export.element).ok_or_else(|| {
            WavefrontError::input_validation(
                "INPUT.TRANSMISSION_EXPORT",
                format!(
                    "transmission export '{}' refers to element {} but the beamline has {}",
                    export.file,
                    export.element,
                    beamline.transmissions().count()
                ),
            )
        })?;
        let path = layout.file(&export.file);
        write_transmission_table(&path, record, export.mode)?;
        debug!(path = %path.display(), mode = ?export.mode, "wrote transmission table");
        written.push(path);
    }
    Ok(written)
}

fn run_single_electron<E>(
    config: &RunConfig,
    engine: &E,
    beamline: &Beamline,
    layout: &OutputLayout,
    report: &mut PipelineReport,
) -> WavefrontResult<()>
where
    E: RadiationEngine + ?Sized,
{
    let spectrum_source = FieldRequest {
        beam: &config.electron_beam,
        field: &config.field,
        precision: config.precision.without_sampling(),
    };

    info!(ne = config.spectrum_mesh.ne, "computing on-axis spectrum");
    let spectrum = engine.compute_field(&spectrum_source, config.spectrum_mesh)?;
    let intensity = engine.extract_intensity(&spectrum, &config.intensity.spectrum)?;
    write_stage(&layout.spectrum(), &intensity, spectrum.mesh(), report)?;

    info!(
        nx = config.wavefront_mesh.nx,
        ny = config.wavefront_mesh.ny,
        "computing initial wavefront"
    );
    let wavefront_source = FieldRequest {
        precision: config.precision,
        ..spectrum_source
    };
    let mut wavefront = engine.compute_field(&wavefront_source, config.wavefront_mesh)?;
    let intensity = engine.extract_intensity(&wavefront, &config.intensity.wavefront)?;
    write_stage(
        &layout.initial_wavefront(),
        &intensity,
        wavefront.mesh(),
        report,
    )?;

    info!(elements = beamline.len(), "propagating wavefront");
    engine.propagate(&mut wavefront, beamline)?;
    let intensity = engine.extract_intensity(&wavefront, &config.intensity.wavefront)?;
    write_stage(
        &layout.propagated_wavefront(),
        &intensity,
        wavefront.mesh(),
        report,
    )?;
    report.propagated_mesh = Some(*wavefront.mesh());
    Ok(())
}

fn write_stage(
    path: &Path,
    intensity: &[f32],
    mesh: &RadMesh,
    report: &mut PipelineReport,
) -> WavefrontResult<()> {
    write_intensity_table(path, intensity, mesh)?;
    debug!(path = %path.display(), values = intensity.len(), "wrote intensity table");
    report.intensity_files.push(path.to_path_buf());
    Ok(())
}
