use super::CliError;
use super::helpers::{
    current_working_dir, load_run_config, print_source_summary, resolve_layout, write_text_file,
};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use wavefront_core::common::config::RunConfig;
use wavefront_core::domain::LaunchContext;
use wavefront_core::modules::pipeline::{run_pipeline, write_transmission_exports};
use wavefront_core::modules::{
    DryRunEngine, EngineKind, engine_available, engine_for, engine_unavailable_error,
};

#[derive(Args, Debug, Clone)]
pub(super) struct ReferenceConfigArgs {
    /// Write the configuration to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub(super) struct TransmissionArgs {
    /// Run configuration (JSON); the reference configuration when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for output files, overriding the configured one
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub(super) struct RunArgs {
    /// Run configuration (JSON); the reference configuration when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for output files, overriding the configured one
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Exercise every stage with zero-valued fields instead of the native engine
    #[arg(long)]
    dry_run: bool,
}

pub(super) fn run_reference_config_command(args: ReferenceConfigArgs) -> Result<i32, CliError> {
    let content = RunConfig::reference()
        .to_json_pretty()
        .map_err(CliError::Compute)?;

    match args.output {
        Some(path) => {
            write_text_file(&path, &content)?;
            println!("Wrote reference configuration to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(0)
}

pub(super) fn run_transmission_command(args: TransmissionArgs) -> Result<i32, CliError> {
    let config = load_run_config(args.config.as_deref())?;
    config.validate().map_err(CliError::Compute)?;

    let working_dir = current_working_dir().map_err(CliError::Compute)?;
    let layout = resolve_layout(&config, args.output_dir.as_deref(), &working_dir);

    // Lens geometry is computed natively, so no radiation engine is needed here.
    let beamline = config
        .beamline
        .assemble(&DryRunEngine::new())
        .map_err(CliError::Compute)?;
    layout.ensure_root().map_err(CliError::Compute)?;
    let written =
        write_transmission_exports(&config, &beamline, &layout).map_err(CliError::Compute)?;

    for path in &written {
        println!("{}", path.display());
    }
    Ok(0)
}

pub(super) fn run_pipeline_command(args: RunArgs) -> Result<i32, CliError> {
    let kind = if args.dry_run {
        EngineKind::DryRun
    } else {
        EngineKind::Native
    };
    if !engine_available(kind) {
        return Err(CliError::Compute(engine_unavailable_error(kind)));
    }

    let config = load_run_config(args.config.as_deref())?;
    let launch = LaunchContext::from_env().map_err(CliError::Compute)?;
    let working_dir = current_working_dir().map_err(CliError::Compute)?;
    let layout = resolve_layout(&config, args.output_dir.as_deref(), &working_dir);
    let engine = engine_for(kind).map_err(CliError::Compute)?;

    info!(engine = %kind, rank = launch.rank(), size = launch.size(), "starting run");
    if launch.role().is_coordinator() {
        print_source_summary(&config);
    }

    let report =
        run_pipeline(&config, engine.as_ref(), &launch, &layout).map_err(CliError::Compute)?;

    if report.role.is_coordinator() {
        for path in report.files_written() {
            println!("Wrote {}", path.display());
        }
        println!(
            "Completed {} run: {} files written, {} checkpoints",
            kind,
            report.files_written().count(),
            report.checkpoints_written
        );
    }
    Ok(0)
}
