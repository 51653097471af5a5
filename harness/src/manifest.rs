//! Run manifest.
//!
//! Before a non-interactive run set starts, the resolved experiment is
//! recorded to `<fname>manifest.json` together with a SHA-256 hash of
//! its canonical JSON form. Two runs with byte-identical manifests are
//! guaranteed to produce byte-identical output files, so the hash is a
//! cheap reproducibility check across machines and archives.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::HarnessError;
use crate::params::ResolvedExperiment;

/// Serialized alongside the experiment so a reader can re-verify it.
#[derive(Debug, Serialize)]
struct RunManifest<'a> {
    config_hash: String,
    experiment: &'a ResolvedExperiment,
}

/// Hash of the experiment's canonical JSON form (lowercase hex).
pub fn config_hash(resolved: &ResolvedExperiment) -> String {
    let canonical = serde_json::to_vec(resolved).expect("experiment serializes");
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    format!("{:x}", hasher.finalize())
}

/// Write `<fname>manifest.json`. Failure is fatal, like any other
/// output-file failure at setup.
pub fn write_manifest(resolved: &ResolvedExperiment) -> Result<PathBuf, HarnessError> {
    let path = PathBuf::from(format!("{}manifest.json", resolved.settings.fname));
    let manifest = RunManifest {
        config_hash: config_hash(resolved),
        experiment: resolved,
    };
    let json = serde_json::to_string_pretty(&manifest).expect("manifest serializes");
    fs::write(&path, json).map_err(|source| HarnessError::OutputFile {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
