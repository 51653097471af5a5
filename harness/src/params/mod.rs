//! Parameter resolution.
//!
//! Parses a declarative input file into parameter declarations and result
//! channel declarations, classifies each parameter value as fixed, swept,
//! or randomly drawn, and binds textual values onto the model's typed
//! fields at run time.
//!
//! # Input grammar (line-oriented)
//!
//! - Blank lines and lines starting with `%` are comments; text after an
//!   unescaped `%` is stripped (`\%` escapes a literal percent).
//! - A line with no `=`, or nothing after `=`, declares an auto-collected
//!   result name (scalar vs list probed from the model's field kind).
//! - `*agentInfo = a b c` declares per-agent result names.
//! - `*edgeList = net1 net2` declares networks to export as edge lists.
//! - `*<key> = value` with `key` in the reserved set assigns a
//!   harness-level setting.
//! - Any other `key = value` adds a parameter: a value that parses as a
//!   distribution code is Random; otherwise space-separated tokens make
//!   the first the initial value and multiple tokens a sweep list.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::HarnessError;
use crate::model::{BindOutcome, FieldKind, SimulationModel};
use crate::rng::RngManager;
use crate::sampler;

/// Reserved key-parameter names, settable via `*<key> = value`.
pub const KEY_PARAMS: [&str; 12] = [
    "seed",
    "sep",
    "steps",
    "iters",
    "reps",
    "fname",
    "testint",
    "teststart",
    "gui",
    "agentint",
    "netint",
    "listint",
];

/// Harness-level settings, one per reserved key parameter.
///
/// Instance-scoped: never shared across harness instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessSettings {
    /// Base random seed; replication `i` runs with `seed + i`.
    pub seed: u64,
    /// Output delimiter.
    pub sep: char,
    /// Step budget per run (mandatory for non-interactive runs).
    pub steps: u64,
    /// Number of outer iterations of random-parameter redraws.
    pub iters: u32,
    /// Replications per parameter combination (mandatory).
    pub reps: u32,
    /// Prefix for every output file name.
    pub fname: String,
    /// Steps between timecourse emissions (mandatory).
    pub testint: u64,
    /// Step at which timecourse emission begins.
    pub teststart: u64,
    /// Interactive mode: bind the initial parameter set and return
    /// without sweeping or writing files.
    pub gui: bool,
    /// Steps between agent-channel emissions (0 = every test step).
    pub agentint: u64,
    /// Steps between network edge-list emissions (0 = every test step).
    pub netint: u64,
    /// Steps between list-channel emissions (0 = every test step).
    pub listint: u64,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            sep: ',',
            steps: 0,
            iters: 1,
            reps: 1,
            fname: String::new(),
            testint: 0,
            teststart: 0,
            gui: false,
            agentint: 0,
            netint: 0,
            listint: 0,
        }
    }
}

impl HarnessSettings {
    /// Assign a reserved key parameter from its textual value.
    ///
    /// Returns false when `key` is not in the reserved set. A value that
    /// fails to parse is logged and the setting keeps its prior value.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        fn parse_or_keep<T: std::str::FromStr + Copy>(slot: &mut T, key: &str, value: &str) {
            match value.parse() {
                Ok(v) => *slot = v,
                Err(_) => warn!(key, value, "key parameter value failed to parse; keeping prior"),
            }
        }

        match key {
            "seed" => parse_or_keep(&mut self.seed, key, value),
            "sep" => match value.chars().next() {
                Some(c) => self.sep = c,
                None => warn!(key, "empty separator ignored"),
            },
            "steps" => parse_or_keep(&mut self.steps, key, value),
            "iters" => parse_or_keep(&mut self.iters, key, value),
            "reps" => parse_or_keep(&mut self.reps, key, value),
            "fname" => self.fname = value.to_string(),
            "testint" => parse_or_keep(&mut self.testint, key, value),
            "teststart" => parse_or_keep(&mut self.teststart, key, value),
            "gui" => {
                self.gui = match value.chars().next() {
                    Some('0') => false,
                    Some('1') => true,
                    _ => value.eq_ignore_ascii_case("true"),
                }
            }
            "agentint" => parse_or_keep(&mut self.agentint, key, value),
            "netint" => parse_or_keep(&mut self.netint, key, value),
            "listint" => parse_or_keep(&mut self.listint, key, value),
            _ => return false,
        }
        true
    }

    /// Read a reserved key parameter back as text (for split-mode output).
    pub fn get(&self, key: &str) -> Option<String> {
        let v = match key {
            "seed" => self.seed.to_string(),
            "sep" => self.sep.to_string(),
            "steps" => self.steps.to_string(),
            "iters" => self.iters.to_string(),
            "reps" => self.reps.to_string(),
            "fname" => self.fname.clone(),
            "testint" => self.testint.to_string(),
            "teststart" => self.teststart.to_string(),
            "gui" => self.gui.to_string(),
            "agentint" => self.agentint.to_string(),
            "netint" => self.netint.to_string(),
            "listint" => self.listint.to_string(),
            _ => return None,
        };
        Some(v)
    }

    /// Mandatory key parameters still unset for a non-interactive run.
    pub fn missing_mandatory(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.steps == 0 {
            missing.push("steps");
        }
        if self.reps == 0 {
            missing.push("reps");
        }
        if self.testint == 0 {
            missing.push("testint");
        }
        missing
    }
}

/// The role of one declared parameter. Exactly one role, never two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamRole {
    /// Single value bound on every run.
    Fixed,
    /// Ordered value list enumerated by the sweep driver.
    Swept(Vec<String>),
    /// Distribution code redrawn once per outer iteration.
    Random(String),
}

/// One declared parameter: name, raw declaration text, role, and the
/// initial slot value. Declaration order is the permanent column
/// contract for every header and row referencing the parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub raw: String,
    pub role: ParamRole,
    /// Initial value: the first draw for Random, the first token
    /// otherwise.
    pub initial: String,
}

impl ParameterSpec {
    /// Classify a raw declaration value.
    ///
    /// The full string is first attempted as a distribution code
    /// (Random); otherwise it is split on spaces — one token is Fixed,
    /// several make a Swept value list (the first token doubling as the
    /// initial value).
    pub fn classify(name: &str, raw: &str, rng: &mut RngManager) -> ParameterSpec {
        let draw = sampler::sample(raw, rng);
        if !draw.is_nan() {
            return ParameterSpec {
                name: name.to_string(),
                raw: raw.to_string(),
                role: ParamRole::Random(raw.to_string()),
                initial: draw.to_string(),
            };
        }

        let tokens: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
        let initial = tokens.first().cloned().unwrap_or_default();
        let role = if tokens.len() > 1 {
            ParamRole::Swept(tokens)
        } else {
            ParamRole::Fixed
        };
        ParameterSpec {
            name: name.to_string(),
            raw: raw.to_string(),
            role,
            initial,
        }
    }
}

/// A fully resolved experiment: settings, parameter declarations, and
/// result channel declarations. Immutable after resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedExperiment {
    pub settings: HarnessSettings,
    pub specs: Vec<ParameterSpec>,
    /// Scalar model-level result names.
    pub model_results: Vec<String>,
    /// List-valued model-level result names.
    pub model_lists: Vec<String>,
    /// Scalar per-agent result names.
    pub agent_results: Vec<String>,
    /// List-valued per-agent result names.
    pub agent_lists: Vec<String>,
    /// Model network fields exported as edge lists.
    pub networks: Vec<String>,
    /// Result names declared in the file itself (retained for split
    /// mode, which re-emits them as empty assignments).
    pub file_results: Vec<String>,
}

impl ResolvedExperiment {
    /// Indices of Random parameters, declaration order.
    pub fn random_indices(&self) -> Vec<usize> {
        self.specs
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.role, ParamRole::Random(_)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of Swept parameters, declaration order.
    pub fn swept_indices(&self) -> Vec<usize> {
        self.specs
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.role, ParamRole::Swept(_)))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Strip an inline comment: everything from the first unescaped `%`.
/// `\%` escapes a literal percent.
fn strip_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '%' => break,
            _ => out.push(c),
        }
    }
    out
}

/// Resolve an input file against a model.
///
/// `auto_results` mirrors the original auto-collection toggle: when off,
/// bare result declarations and `*agentInfo` lines are ignored.
pub fn resolve_file(
    path: &Path,
    model: &dyn SimulationModel,
    auto_results: bool,
) -> Result<ResolvedExperiment, HarnessError> {
    let text = fs::read_to_string(path).map_err(|source| HarnessError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut settings = HarnessSettings::default();
    let mut raw_params: Vec<(String, String)> = Vec::new();
    let mut model_results = Vec::new();
    let mut model_lists = Vec::new();
    let mut agent_results = Vec::new();
    let mut agent_lists = Vec::new();
    let mut networks = Vec::new();

    for line in text.lines() {
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let line = strip_comment(line);

        let (key, value) = match line.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (line.trim().to_string(), String::new()),
        };

        if value.is_empty() {
            // bare name: an auto-collected result declaration
            if auto_results && !key.is_empty() {
                match model.field_kind(&key) {
                    FieldKind::List => model_lists.push(key),
                    // unknown names default to scalar, delegated to the
                    // model at readout time
                    _ => model_results.push(key),
                }
            }
            continue;
        }

        if key == "*agentInfo" {
            if auto_results {
                for name in value.split_whitespace() {
                    match model.agent_field_kind(name) {
                        FieldKind::List => agent_lists.push(name.to_string()),
                        _ => agent_results.push(name.to_string()),
                    }
                }
            }
            continue;
        }
        if key == "*edgeList" {
            networks = value.split_whitespace().map(str::to_string).collect();
            continue;
        }

        if let Some(stripped) = key.strip_prefix('*') {
            if settings.set(stripped, &value) {
                continue;
            }
            warn!(key = %key, "unrecognized key parameter; treating as a model parameter");
        }

        if raw_params.iter().any(|(k, _)| k == &key) {
            warn!(name = %key, "duplicate parameter declaration ignored");
            continue;
        }
        raw_params.push((key, value));
    }

    // Classification draws come from a stream seeded with the file's own
    // base seed so resolution itself is reproducible.
    let mut rng = RngManager::new(settings.seed);
    let specs: Vec<ParameterSpec> = raw_params
        .iter()
        .map(|(name, raw)| ParameterSpec::classify(name, raw, &mut rng))
        .collect();

    let file_results = model_results.clone();

    Ok(ResolvedExperiment {
        settings,
        specs,
        model_results,
        model_lists,
        agent_results,
        agent_lists,
        networks,
        file_results,
    })
}

/// The per-run value table: one string-encoded slot per declared
/// parameter, overwritten at the start of every test run before binding.
#[derive(Debug, Clone)]
pub struct ParamTable {
    values: Vec<String>,
}

impl ParamTable {
    /// Initialize slots from the specs' initial values.
    pub fn new(specs: &[ParameterSpec]) -> Self {
        Self {
            values: specs.iter().map(|s| s.initial.clone()).collect(),
        }
    }

    pub fn get(&self, idx: usize) -> &str {
        &self.values[idx]
    }

    pub fn set(&mut self, idx: usize, value: String) {
        self.values[idx] = value;
    }

    /// Bind every slot onto the model, zeroing declared scalar results
    /// first (aggregates must not carry across runs).
    ///
    /// Unknown fields are delegated silently (debug log); coercion
    /// failures leave the field unmodified (warned).
    pub fn bind_all(
        &self,
        specs: &[ParameterSpec],
        scalar_results: &[String],
        model: &mut dyn SimulationModel,
    ) {
        for name in scalar_results {
            model.bind_field(name, "0");
        }
        for (spec, value) in specs.iter().zip(&self.values) {
            match model.bind_field(&spec.name, value) {
                BindOutcome::Bound => {}
                BindOutcome::UnknownField => {
                    debug!(name = %spec.name, "no such field; delegated to the model")
                }
                BindOutcome::CoercionFailed => {
                    warn!(name = %spec.name, value = %value, "coercion failed; field unmodified")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_fixed() {
        let mut rng = RngManager::new(1);
        let spec = ParameterSpec::classify("a", "42", &mut rng);
        assert_eq!(spec.role, ParamRole::Fixed);
        assert_eq!(spec.initial, "42");
    }

    #[test]
    fn test_classify_swept_keeps_all_tokens() {
        let mut rng = RngManager::new(1);
        let spec = ParameterSpec::classify("a", "1 2 3", &mut rng);
        assert_eq!(
            spec.role,
            ParamRole::Swept(vec!["1".into(), "2".into(), "3".into()])
        );
        assert_eq!(spec.initial, "1");
    }

    #[test]
    fn test_classify_random() {
        let mut rng = RngManager::new(1);
        let spec = ParameterSpec::classify("a", "U(2,4)", &mut rng);
        assert_eq!(spec.role, ParamRole::Random("U(2,4)".into()));
        let v: f64 = spec.initial.parse().unwrap();
        assert!((2.0..4.0).contains(&v));
    }

    #[test]
    fn test_classify_malformed_code_is_fixed() {
        // a malformed code is not a random parameter; it falls through
        // to ordinary token classification
        let mut rng = RngManager::new(1);
        let spec = ParameterSpec::classify("a", "N(1)", &mut rng);
        assert_eq!(spec.role, ParamRole::Fixed);
        assert_eq!(spec.initial, "N(1)");
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("a = 1 % note"), "a = 1 ");
        assert_eq!(strip_comment("a = 1"), "a = 1");
        assert_eq!(strip_comment(r"pct = 50\% % real comment"), "pct = 50% ");
    }

    #[test]
    fn test_settings_set_and_defaults() {
        let mut s = HarnessSettings::default();
        assert!(s.set("steps", "100"));
        assert!(s.set("sep", ";"));
        assert!(s.set("gui", "1"));
        assert!(!s.set("bogus", "1"));
        assert_eq!(s.steps, 100);
        assert_eq!(s.sep, ';');
        assert!(s.gui);
        // unparsable value keeps the prior one
        assert!(s.set("steps", "lots"));
        assert_eq!(s.steps, 100);
    }

    #[test]
    fn test_missing_mandatory() {
        let mut s = HarnessSettings::default();
        assert_eq!(s.missing_mandatory(), vec!["steps", "testint"]);
        s.set("steps", "10");
        s.set("testint", "2");
        s.set("reps", "3");
        assert!(s.missing_mandatory().is_empty());
    }
}
