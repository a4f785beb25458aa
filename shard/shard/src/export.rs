//! JSON export of reconstructed vessels.
//!
//! Each vessel gets its own directory holding `adjacency.json` (an array
//! of `[a, b]` facet id pairs) and one `<fragment>.json` point cloud per
//! fragment (an array of `{ "pos", "norm", "label" }` objects).

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::Serialize;
use shard_match::AdjacencyGraph;
use shard_sample::LabeledPoint;
use shard_types::Fragment;
use tracing::info;

use crate::dataset::Vessel;
use crate::error::{ExportError, ExportResult};
use crate::pipeline::{BatchOutput, PipelineParams, ReconstructionSummary, run_batch};

/// Name of the adjacency file in each vessel directory.
pub const ADJACENCY_FILE: &str = "adjacency.json";

/// What was written for one vessel.
#[derive(Debug, Clone)]
pub struct VesselExport {
    /// Vessel id.
    pub vessel: String,
    /// Directory the files were written to.
    pub directory: PathBuf,
    /// Files written, adjacency first.
    pub files: Vec<PathBuf>,
    /// Counts from the reconstruction.
    pub summary: ReconstructionSummary,
}

/// Write the adjacency graph to `dir/adjacency.json`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_adjacency(dir: &Path, graph: &AdjacencyGraph) -> ExportResult<PathBuf> {
    let path = dir.join(ADJACENCY_FILE);
    write_json(&path, graph, true)?;
    Ok(path)
}

/// File name of a fragment's point cloud.
///
/// Characters that are not valid in file names are replaced with `_`.
#[must_use]
pub fn point_cloud_file_name(name: &str) -> String {
    format!("{}.json", sanitize_filename(name))
}

/// Write one fragment's point cloud to `dir/<name>.json`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_point_cloud(dir: &Path, name: &str, points: &[LabeledPoint]) -> ExportResult<PathBuf> {
    let path = dir.join(point_cloud_file_name(name));
    write_json(&path, points, false)?;
    Ok(path)
}

/// Write a processed batch into `dir`, creating it if needed.
///
/// `fragments` must be the fragments `output` was computed from.
///
/// # Errors
///
/// Returns [`ExportError::FileNameCollision`] before writing anything if
/// two fragments (or a fragment and the adjacency file) map to the same
/// file name, or an error if the directory or any file cannot be written.
pub fn write_batch(
    dir: &Path,
    vessel: &str,
    fragments: &[Fragment],
    output: &BatchOutput,
) -> ExportResult<VesselExport> {
    check_file_names(fragments)?;
    fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = vec![write_adjacency(dir, output.reconstruction.graph())?];
    for (fragment, points) in fragments.iter().zip(&output.clouds) {
        files.push(write_point_cloud(dir, fragment.name(), points)?);
    }

    Ok(VesselExport {
        vessel: vessel.to_string(),
        directory: dir.to_path_buf(),
        files,
        summary: output.reconstruction.summary(),
    })
}

/// Reconstruct, sample and write one vessel into `root/<vessel id>/`.
///
/// # Errors
///
/// Returns [`ExportError::EmptyVessel`] for a vessel without fragments, or
/// an I/O or JSON error from writing.
pub fn export_vessel(
    root: &Path,
    vessel: &Vessel,
    params: &PipelineParams,
) -> ExportResult<VesselExport> {
    if vessel.fragments.is_empty() {
        return Err(ExportError::EmptyVessel {
            vessel: vessel.id.clone(),
        });
    }

    let output = run_batch(&vessel.fragments, params);
    let export = write_batch(&root.join(&vessel.id), &vessel.id, &vessel.fragments, &output)?;
    info!(
        vessel = %vessel.id,
        source = %vessel.source_prefix,
        edges = export.summary.edges,
        files = export.files.len(),
        "exported vessel"
    );
    Ok(export)
}

/// Export every vessel under `root`, in order.
///
/// # Errors
///
/// Stops at the first vessel that fails to export.
pub fn export_dataset(
    root: &Path,
    vessels: &[Vessel],
    params: &PipelineParams,
) -> ExportResult<Vec<VesselExport>> {
    vessels
        .iter()
        .map(|vessel| export_vessel(root, vessel, params))
        .collect()
}

fn check_file_names(fragments: &[Fragment]) -> ExportResult<()> {
    let mut claimed: HashMap<String, &str> = HashMap::with_capacity(fragments.len() + 1);
    claimed.insert(ADJACENCY_FILE.to_string(), "adjacency graph");
    for fragment in fragments {
        let file = point_cloud_file_name(fragment.name());
        if let Some(existing) = claimed.get(&file) {
            return Err(ExportError::FileNameCollision {
                file,
                existing: (*existing).to_string(),
                fragment: fragment.name().to_string(),
            });
        }
        claimed.insert(file, fragment.name());
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> ExportResult<()> {
    let file = File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    let encoded = if pretty {
        serde_json::to_writer_pretty(&mut writer, value)
    } else {
        serde_json::to_writer(&mut writer, value)
    };
    encoded.map_err(|e| ExportError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn sanitize_filename(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
