//! Genome snapshot persistence.
//!
//! Snapshots are labeled JSON files in a checkpoint directory. The envelope
//! records the fitness and save time alongside the genome itself, so a
//! directory of snapshots stays self-describing.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::CheckpointError;
use crate::neat::Genome;

/// A saved genome with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeSnapshot {
    /// RFC 3339 timestamp of the save.
    pub saved_at: String,
    /// Fitness the genome had when saved.
    pub fitness: f64,
    /// The genome itself.
    pub genome: Genome,
}

fn snapshot_path(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("{label}.json"))
}

/// Saves a genome under the given label, creating the directory if needed.
/// Returns the path written.
pub fn save_genome(
    dir: &Path,
    label: &str,
    genome: &Genome,
    fitness: f64,
) -> Result<PathBuf, CheckpointError> {
    std::fs::create_dir_all(dir)?;
    let snapshot = GenomeSnapshot {
        saved_at: chrono::Utc::now().to_rfc3339(),
        fitness,
        genome: genome.clone(),
    };
    let path = snapshot_path(dir, label);
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(&path, json)?;
    info!("genome snapshot written to {}", path.display());
    Ok(path)
}

/// Loads the genome saved under the given label.
///
/// A missing label is reported as [`CheckpointError::NotFound`] rather than a
/// bare i/o error, since callers typically want to surface the label.
pub fn load_genome(dir: &Path, label: &str) -> Result<GenomeSnapshot, CheckpointError> {
    let path = snapshot_path(dir, label);
    if !path.exists() {
        return Err(CheckpointError::NotFound {
            path: path.display().to_string(),
        });
    }
    let json = std::fs::read_to_string(&path)?;
    let snapshot = serde_json::from_str(&json)?;
    Ok(snapshot)
}
