use super::CliError;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use wavefront_core::common::config::RunConfig;
use wavefront_core::domain::{WavefrontError, WavefrontResult};
use wavefront_core::modules::pipeline::OutputLayout;

pub(super) fn current_working_dir() -> WavefrontResult<PathBuf> {
    std::env::current_dir().map_err(|source| {
        WavefrontError::io_system(
            "IO.CLI_CURRENT_DIR",
            format!("failed to read current working directory: {}", source),
        )
    })
}

/// Loads `path`, or the built-in reference configuration when no file is given.
pub(super) fn load_run_config(path: Option<&Path>) -> Result<RunConfig, CliError> {
    match path {
        Some(path) => RunConfig::load(path).map_err(CliError::Compute),
        None => Ok(RunConfig::reference()),
    }
}

/// `--output-dir` replaces the configured directory; both resolve against `working_dir`.
pub(super) fn resolve_layout(
    config: &RunConfig,
    output_dir: Option<&Path>,
    working_dir: &Path,
) -> OutputLayout {
    let layout = OutputLayout::from_config(&config.output, working_dir);
    match output_dir {
        Some(directory) => layout.with_root(working_dir.join(directory)),
        None => layout,
    }
}

pub(super) fn write_text_file(path: &Path, content: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

pub(super) fn print_source_summary(config: &RunConfig) {
    let summary = config.source_summary();
    println!("Electron energy: {:.4} GeV", summary.electron_energy_gev);
    println!("Deflection parameter K: {:.4}", summary.deflection_parameter);
    println!(
        "Fundamental photon energy: {:.1} eV",
        summary.fundamental_photon_energy_ev
    );
}
