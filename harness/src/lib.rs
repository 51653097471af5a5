//! Sweep Harness Core - Rust Engine
//!
//! Declarative experiment-configuration and results-aggregation harness
//! for discrete-event simulation models.
//!
//! # Architecture
//!
//! - **rng**: Deterministic random number generation
//! - **sampler**: Coded random-distribution sub-language
//! - **model**: Capability interface + typed field registry
//! - **params**: Input-file resolution and parameter binding
//! - **sweep**: Cartesian sweep recursion and replication
//! - **results**: Multi-channel interval-gated output files
//! - **template**: Editable input-file skeleton generation
//! - **split**: Input-file partitioning for distributed sweeps
//! - **netload**: Edge-list file loading
//! - **manifest**: Reproducibility record per run set
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG); replication `i`
//!    always runs with base seed + i
//! 2. Parameter declaration order is the permanent column contract for
//!    every header and row
//! 3. Output files are append-only once opened; headers precede data

// Module declarations
pub mod error;
#[allow(clippy::module_inception)]
pub mod harness;
pub mod manifest;
pub mod model;
pub mod netload;
pub mod params;
pub mod results;
pub mod rng;
pub mod sampler;
pub mod split;
pub mod sweep;
pub mod template;

// Re-exports for convenience
pub use error::HarnessError;
pub use harness::Harness;
pub use model::{
    join_list, BindOutcome, EdgeRecord, FieldKind, FieldRegistry, SimulationModel,
};
pub use netload::{load_network, Network};
pub use params::{
    HarnessSettings, ParamRole, ParamTable, ParameterSpec, ResolvedExperiment, KEY_PARAMS,
};
pub use results::{ChannelCounts, ResultsWriter};
pub use rng::RngManager;
pub use sampler::{sample, DistributionCode};
pub use sweep::{RebindPolicy, RunSummary, SweepDriver};
