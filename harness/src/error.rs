//! Harness error types.
//!
//! Only setup-time failures are errors: a missing input file, an
//! uncreatable output file, or missing mandatory key parameters abort the
//! whole run set with no partial-output retry. Everything recoverable
//! (malformed distribution codes, unknown bind names, coercion failures,
//! failed network exports) is logged and the run continues; none of it
//! surfaces here.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal harness errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("input file {path} unreadable: {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create output file {path}: {source}")]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing key parameters for running without GUI: {}", .0.join(", "))]
    MissingKeyParams(Vec<&'static str>),

    #[error("cannot split on {0}: not a swept parameter")]
    UnknownSplitParam(String),
}
