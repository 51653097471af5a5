//! Sweep driver.
//!
//! Enumerates the cartesian product of every swept parameter's value
//! list and runs the simulation once per combination per replication.
//!
//! One outer iteration redraws every Random parameter from a single
//! long-lived stream seeded with the base seed (never reseeded between
//! iterations); a Random draw then stays fixed across every sweep leaf
//! and replication within that iteration. Recursion fixes swept values
//! left-to-right, so the last-declared parameter varies fastest.
//!
//! Everything is single-threaded and synchronous: each run mutates the
//! shared parameter table and the model's bound fields in place, so
//! exactly one (leaf × replication) executes at a time.

use tracing::{info, warn};

use crate::model::SimulationModel;
use crate::params::{ParamRole, ParamTable, ResolvedExperiment};
use crate::results::{ChannelCounts, ResultsWriter};
use crate::rng::RngManager;
use crate::sampler;

/// When parameter values are rebound onto the model.
///
/// Observed variants of this harness disagreed on whether rebinding
/// happens once per sweep leaf or once per replication, so it is an
/// explicit configuration choice. Rebinding per replication is the
/// default because binding may mutate aggregate state owned by the
/// model, which must not carry from one replication into the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebindPolicy {
    /// Rebind every parameter fresh on every replication (default).
    #[default]
    PerReplication,
    /// Bind once per sweep leaf and reuse across its replications.
    PerLeaf,
}

/// Summary of a completed run set.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// Distinct parameter combinations executed.
    pub leaf_runs: u64,
    /// Total replications across all leaves and iterations.
    pub replications: u64,
    /// Rows written per output channel.
    pub rows: ChannelCounts,
}

/// Drives the iterate → redraw → sweep → replicate cycle.
pub struct SweepDriver {
    resolved: ResolvedExperiment,
    table: ParamTable,
    /// Long-lived stream for random-parameter redraws, seeded once with
    /// the base seed.
    paramgen: RngManager,
    rebind: RebindPolicy,
    random_idx: Vec<usize>,
    swept_idx: Vec<usize>,
    summary: RunSummary,
}

impl SweepDriver {
    pub fn new(resolved: &ResolvedExperiment, rebind: RebindPolicy) -> Self {
        Self {
            table: ParamTable::new(&resolved.specs),
            paramgen: RngManager::new(resolved.settings.seed),
            rebind,
            random_idx: resolved.random_indices(),
            swept_idx: resolved.swept_indices(),
            summary: RunSummary::default(),
            resolved: resolved.clone(),
        }
    }

    /// The table as initialized from the specs, for header generation.
    pub fn table(&self) -> &ParamTable {
        &self.table
    }

    /// Run the whole experiment: `max(iters, 1)` outer iterations of
    /// random redraws, each sweeping the full cartesian grid.
    pub fn run(&mut self, model: &mut dyn SimulationModel, writer: &mut ResultsWriter) -> RunSummary {
        let iters = self.resolved.settings.iters.max(1);
        for _ in 0..iters {
            for idx in self.random_idx.clone() {
                if let ParamRole::Random(code) = &self.resolved.specs[idx].role {
                    let draw = sampler::sample(code, &mut self.paramgen);
                    if draw.is_nan() {
                        // slot keeps its prior value
                        warn!(
                            name = %self.resolved.specs[idx].name,
                            "random parameter not formatted correctly"
                        );
                        continue;
                    }
                    self.table.set(idx, draw.to_string());
                }
            }

            if self.swept_idx.is_empty() {
                self.test(model, writer);
            } else {
                self.sweep(0, model, writer);
            }
        }
        self.summary.rows = writer.counts();
        self.summary
    }

    /// Depth-first recursion over the swept value lists. Each level
    /// fixes one parameter's concrete value; the leaf runs the test.
    fn sweep(&mut self, depth: usize, model: &mut dyn SimulationModel, writer: &mut ResultsWriter) {
        let idx = self.swept_idx[depth];
        let values = match &self.resolved.specs[idx].role {
            ParamRole::Swept(values) => values.clone(),
            _ => unreachable!("swept_idx only holds swept parameters"),
        };
        for value in values {
            self.table.set(idx, value);
            if depth + 1 < self.swept_idx.len() {
                self.sweep(depth + 1, model, writer);
            } else {
                self.test(model, writer);
            }
        }
    }

    /// One test run: `reps` replications of the current parameter
    /// combination. Replication `i` reseeds the model's stream with
    /// base seed + i, drives the engine to the step budget or
    /// exhaustion, gates timecourse emission, and flushes to the end
    /// channel.
    fn test(&mut self, model: &mut dyn SimulationModel, writer: &mut ResultsWriter) {
        let settings = &self.resolved.settings;
        let steps = settings.steps;
        let testint = settings.testint.max(1);
        let teststart = settings.teststart;

        let mut prefix: Vec<String> = Vec::with_capacity(self.random_idx.len() + self.swept_idx.len());
        for &i in &self.random_idx {
            prefix.push(self.table.get(i).to_string());
        }
        for &i in &self.swept_idx {
            prefix.push(self.table.get(i).to_string());
        }
        info!(combination = %prefix.join(" "), "running test");
        self.summary.leaf_runs += 1;

        for rep in 0..settings.reps {
            if rep == 0 || self.rebind == RebindPolicy::PerReplication {
                self.table
                    .bind_all(&self.resolved.specs, &self.resolved.model_results, model);
            }

            let seed = settings.seed + u64::from(rep);
            model.rng_mut().reseed(seed);
            model.start();

            while model.step_count() < steps {
                let step = model.step_count();
                if step >= teststart && step % testint == 0 {
                    writer.write_results(model, seed, &prefix, false);
                }
                if !model.step() {
                    break;
                }
            }
            writer.write_results(model, seed, &prefix, true);
            model.finish();
            self.summary.replications += 1;
        }
    }
}
