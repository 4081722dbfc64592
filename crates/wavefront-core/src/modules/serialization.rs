//! ASCII column tables for intensity and transmission data.
//!
//! Both tables open with the nine-line mesh header
//! (`#<value> #<label>`, energy axis first) followed by one ` <value>` line per
//! grid cell in C-aligned order.

use crate::domain::{RadMesh, WavefrontError, WavefrontResult};
use crate::modules::transmission::{TransmissionMode, TransmissionRecord};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const HEADER_LINE_COUNT: usize = 9;

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

fn push_header(out: &mut String, mesh: &RadMesh) {
    let _ = writeln!(out, "#{:?} #Initial Photon Energy [eV]", mesh.e_start);
    let _ = writeln!(out, "#{:?} #Final Photon Energy [eV]", mesh.e_fin);
    let _ = writeln!(out, "#{} #Number of points vs Photon Energy", mesh.ne);
    let _ = writeln!(out, "#{:?} #Initial Horizontal Position [m]", mesh.x_start);
    let _ = writeln!(out, "#{:?} #Final Horizontal Position [m]", mesh.x_fin);
    let _ = writeln!(out, "#{} #Number of points vs Horizontal Position", mesh.nx);
    let _ = writeln!(out, "#{:?} #Initial Vertical Position [m]", mesh.y_start);
    let _ = writeln!(out, "#{:?} #Final Vertical Position [m]", mesh.y_fin);
    let _ = writeln!(out, "#{} #Number of points vs Vertical Position", mesh.ny);
}

/// Renders a flat intensity array whose length must equal `mesh.point_count()`.
pub fn render_intensity_table(values: &[f32], mesh: &RadMesh) -> WavefrontResult<String> {
    let expected = mesh.point_count();
    if values.len() != expected {
        return Err(WavefrontError::input_validation(
            "INPUT.INTENSITY_LENGTH",
            format!(
                "intensity array holds {} values but the mesh {} x {} x {} needs {}",
                values.len(),
                mesh.ne,
                mesh.nx,
                mesh.ny,
                expected
            ),
        ));
    }

    // Header plus roughly a dozen characters per value.
    let mut out = String::with_capacity(512 + 12 * values.len());
    push_header(&mut out, mesh);
    for value in values {
        let _ = writeln!(out, " {:?}", value);
    }
    Ok(out)
}

/// Renders one component of a transmission record, one value per cell of `max(1, ne) * nx * ny`.
pub fn render_transmission_table(record: &TransmissionRecord, mode: TransmissionMode) -> String {
    let mesh = record.mesh();
    let mut out = String::with_capacity(512 + 24 * record.cell_count());
    push_header(&mut out, mesh);
    for value in record.values(mode) {
        let _ = writeln!(out, " {:?}", value);
    }
    out
}

/// Creates or overwrites `path` with the intensity table. Nothing is written
/// when the array does not match the mesh.
pub fn write_intensity_table(path: &Path, values: &[f32], mesh: &RadMesh) -> WavefrontResult<()> {
    let content = render_intensity_table(values, mesh)?;
    write_text_artifact(path, &content).map_err(|source| {
        WavefrontError::io_system(
            "IO.INTENSITY_WRITE",
            format!(
                "failed to write intensity table '{}': {}",
                path.display(),
                source
            ),
        )
    })
}

pub fn write_transmission_table(
    path: &Path,
    record: &TransmissionRecord,
    mode: TransmissionMode,
) -> WavefrontResult<()> {
    let content = render_transmission_table(record, mode);
    write_text_artifact(path, &content).map_err(|source| {
        WavefrontError::io_system(
            "IO.TRANSMISSION_WRITE",
            format!(
                "failed to write transmission table '{}': {}",
                path.display(),
                source
            ),
        )
    })
}
