//! Model capability interface.
//!
//! The harness never sees a concrete simulation model type. A model is
//! injected as a [`SimulationModel`] trait object exposing:
//!
//! - declared field names and kinds (the binding targets),
//! - dynamic binding of textual values onto typed fields,
//! - result readout as strings (scalar and list-valued),
//! - an enumerable agent collection and named networks,
//! - the engine hooks: seedable stream, `start`, per-step advance,
//!   step counter, teardown.
//!
//! Unknown names are never fatal: the harness delegates them back to the
//! model, which may handle them manually or ignore them. Concrete models
//! typically implement the field surface with a [`registry::FieldRegistry`]
//! rather than hand-written match arms.

pub mod registry;

use serde::{Deserialize, Serialize};

use crate::rng::RngManager;

pub use registry::{join_list, FieldRegistry};

/// The kind of a declared model or agent field.
///
/// Drives both value coercion during binding and the scalar-vs-list
/// classification of declared results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Text field; bound values are stored as-is.
    Str,
    /// Integer field; accepts a double literal, truncated.
    Int,
    /// Floating-point field.
    Double,
    /// Boolean field; accepts "0"/"1" as well as "true"/"false".
    Bool,
    /// Character field; takes the first character of the value.
    Char,
    /// List-valued result field (read-only aggregate).
    List,
    /// Relational network field exported as an edge list.
    Network,
    /// Name the model does not declare. Non-fatal; classification
    /// defaults to scalar and binding is delegated to the model.
    Unknown,
}

/// Outcome of binding one textual value onto one named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Value coerced and stored.
    Bound,
    /// No field with that name; delegated to the model, field untouched.
    UnknownField,
    /// Field exists but the value failed numeric coercion; field keeps
    /// its prior value.
    CoercionFailed,
}

/// One directed edge of an exported network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source node label.
    pub from: String,
    /// Target node label.
    pub to: String,
    /// Free-form edge annotation (may be empty).
    pub info: String,
}

/// Capability interface a concrete simulation model implements for the
/// harness.
///
/// The engine-facing half (`start`/`step`/`step_count`/`finish` and the
/// seedable stream) belongs to the externally supplied simulation engine;
/// the field-facing half replaces reflection with explicit accessors.
pub trait SimulationModel {
    /// Names of the model's bindable parameter fields, in declaration
    /// order. Used by the template generator.
    fn param_names(&self) -> Vec<String>;

    /// Names of the agent type's eligible result fields, in declaration
    /// order. Used by the template generator's `*agentInfo` suggestion.
    fn agent_param_names(&self) -> Vec<String>;

    /// Names of the model's declared network fields.
    fn network_names(&self) -> Vec<String>;

    /// Kind of a named model field ([`FieldKind::Unknown`] if undeclared).
    fn field_kind(&self, name: &str) -> FieldKind;

    /// Kind of a named agent field ([`FieldKind::Unknown`] if undeclared).
    fn agent_field_kind(&self, name: &str) -> FieldKind;

    /// Bind a textual value onto a named model field with type coercion.
    ///
    /// The value may itself be a distribution code; it is re-sampled
    /// against the model's stream before coercion.
    fn bind_field(&mut self, name: &str, value: &str) -> BindOutcome;

    /// Read a named model-level result as a string. List-valued results
    /// serialize as their flattened textual sequence. Unknown names
    /// return an empty string.
    fn read_result(&self, name: &str) -> String;

    /// Number of agent slots (including empty ones).
    fn agent_count(&self) -> usize;

    /// Display label of the agent in slot `idx`, or `None` for an empty
    /// slot. Empty slots are skipped by every per-agent channel.
    fn agent_label(&self, idx: usize) -> Option<String>;

    /// Read a named result from the agent in slot `idx`.
    fn read_agent_result(&self, idx: usize, name: &str) -> String;

    /// Current edges of a named network, or `None` when the network is
    /// missing/unavailable (that network is skipped for the interval).
    fn network_edges(&self, name: &str) -> Option<Vec<EdgeRecord>>;

    /// The model's seedable random stream. Replication `i` reseeds it
    /// with base seed + i.
    fn rng_mut(&mut self) -> &mut RngManager;

    /// Initialize one simulation run.
    fn start(&mut self);

    /// Advance one step. Returns false when the engine is exhausted.
    fn step(&mut self) -> bool;

    /// Steps taken since `start`.
    fn step_count(&self) -> u64;

    /// Teardown hook invoked after each replication.
    fn finish(&mut self) {}
}
