//! Input-file partitioning.
//!
//! Splits one resolved input file into a family of smaller input files,
//! one per combination of the named swept parameters' values — useful
//! for farming a large sweep out across separate processes. Each output
//! file carries the full key-parameter block (with its `fname` prefixed
//! by the partition tag), every parameter with its partitioned value,
//! and the file-declared result names as empty assignments so the
//! outputs resolve identically to the original.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::HarnessError;
use crate::params::{ResolvedExperiment, KEY_PARAMS};

/// Partition `resolved` by the given `(parameter, tag)` pairs.
///
/// Each pair names a declared parameter whose space-separated values
/// become one partition axis; `tag` prefixes the generated file names
/// (and output `fname`s) as `<tag><value>`. Returns the paths written,
/// one per combination.
pub fn split_file(
    resolved: &ResolvedExperiment,
    input_name: &str,
    pairs: &[(String, String)],
    out_dir: &Path,
) -> Result<Vec<PathBuf>, HarnessError> {
    // resolve every named parameter up front so an unknown name fails
    // before any file is written
    let mut axes: Vec<(usize, String, Vec<String>)> = Vec::with_capacity(pairs.len());
    for (param, tag) in pairs {
        let idx = resolved
            .specs
            .iter()
            .position(|s| &s.name == param)
            .ok_or_else(|| HarnessError::UnknownSplitParam(param.clone()))?;
        let values: Vec<String> = resolved.specs[idx]
            .raw
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if values.len() < 2 {
            return Err(HarnessError::UnknownSplitParam(param.clone()));
        }
        axes.push((idx, tag.clone(), values));
    }

    let mut written = Vec::new();
    let mut overrides = HashMap::new();
    split_rec(
        resolved,
        input_name,
        &axes,
        out_dir,
        "",
        &mut overrides,
        &mut written,
    )?;
    Ok(written)
}

fn split_rec(
    resolved: &ResolvedExperiment,
    input_name: &str,
    axes: &[(usize, String, Vec<String>)],
    out_dir: &Path,
    ext: &str,
    overrides: &mut HashMap<usize, String>,
    written: &mut Vec<PathBuf>,
) -> Result<(), HarnessError> {
    let (idx, tag, values) = match axes.first() {
        Some(axis) => axis,
        None => {
            // every axis fixed: write one partition file
            written.push(write_partition(resolved, input_name, out_dir, ext, overrides)?);
            return Ok(());
        }
    };

    for value in values {
        overrides.insert(*idx, value.clone());
        let ext = format!("{}{}{}", tag, value, ext);
        split_rec(
            resolved,
            input_name,
            &axes[1..],
            out_dir,
            &ext,
            overrides,
            written,
        )?;
    }
    overrides.remove(idx);
    Ok(())
}

fn write_partition(
    resolved: &ResolvedExperiment,
    input_name: &str,
    out_dir: &Path,
    ext: &str,
    overrides: &HashMap<usize, String>,
) -> Result<PathBuf, HarnessError> {
    let path = out_dir.join(format!("{}{}", ext, input_name));
    let file = File::create(&path).map_err(|source| HarnessError::OutputFile {
        path: path.clone(),
        source,
    })?;
    let mut w = BufWriter::new(file);

    let io_err = |source| HarnessError::OutputFile {
        path: path.clone(),
        source,
    };

    // key-parameter block; fname picks up the partition tag so outputs
    // from sibling partitions never collide
    for key in KEY_PARAMS {
        if key == "fname" {
            continue;
        }
        let value = resolved.settings.get(key).expect("reserved key");
        writeln!(w, "*{} = {}", key, value).map_err(io_err)?;
    }
    writeln!(w, "*fname = {}{}", ext, resolved.settings.fname).map_err(io_err)?;

    for (i, spec) in resolved.specs.iter().enumerate() {
        let value = overrides.get(&i).unwrap_or(&spec.raw);
        writeln!(w, "{} = {}", spec.name, value).map_err(io_err)?;
    }

    for name in &resolved.file_results {
        writeln!(w, "{} = ", name).map_err(io_err)?;
    }

    w.flush().map_err(io_err)?;
    Ok(path)
}
