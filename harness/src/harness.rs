//! Harness facade.
//!
//! Wires the resolver, sweep driver, and results writer together behind
//! the three entry points the bootstrap code uses: emit a template,
//! run an input file, or partition an input file for distribution.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::HarnessError;
use crate::manifest;
use crate::model::SimulationModel;
use crate::params::{self, ParamTable, ResolvedExperiment};
use crate::results::ResultsWriter;
use crate::split;
use crate::sweep::{RebindPolicy, RunSummary, SweepDriver};
use crate::template;

/// Experiment harness over an injected simulation model.
pub struct Harness<M: SimulationModel> {
    model: M,
    auto_results: bool,
    rebind: RebindPolicy,
}

impl<M: SimulationModel> Harness<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            auto_results: true,
            rebind: RebindPolicy::default(),
        }
    }

    /// Disable auto-collection of bare result declarations.
    pub fn with_auto_results(mut self, auto_results: bool) -> Self {
        self.auto_results = auto_results;
        self
    }

    /// Choose when parameters are rebound onto the model.
    pub fn with_rebind_policy(mut self, rebind: RebindPolicy) -> Self {
        self.rebind = rebind;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Emit the editable input-file skeleton to the working directory.
    pub fn write_template(&self) -> Result<(), HarnessError> {
        template::write_template(&self.model)
    }

    /// Resolve an input file without running it.
    pub fn resolve(&self, path: &Path) -> Result<ResolvedExperiment, HarnessError> {
        params::resolve_file(path, &self.model, self.auto_results)
    }

    /// Resolve and run an input file: open channels, record the
    /// manifest, and sweep.
    ///
    /// In interactive (gui) mode only the initial parameter values are
    /// bound and no file is written; otherwise the mandatory key
    /// parameters must be set or the run aborts before any output.
    pub fn run_file(&mut self, path: &Path) -> Result<RunSummary, HarnessError> {
        let resolved = self.resolve(path)?;

        if resolved.settings.gui {
            let table = ParamTable::new(&resolved.specs);
            table.bind_all(&resolved.specs, &resolved.model_results, &mut self.model);
            return Ok(RunSummary::default());
        }

        let missing = resolved.settings.missing_mandatory();
        if !missing.is_empty() {
            return Err(HarnessError::MissingKeyParams(missing));
        }

        manifest::write_manifest(&resolved)?;

        let mut driver = SweepDriver::new(&resolved, self.rebind);
        let mut writer = ResultsWriter::open(&resolved, driver.table())?;
        let summary = driver.run(&mut self.model, &mut writer);
        writer.flush();

        info!(
            leaf_runs = summary.leaf_runs,
            replications = summary.replications,
            "run set complete"
        );
        Ok(summary)
    }

    /// Resolve an input file and partition it by the given
    /// `(parameter, tag)` pairs into sibling input files next to the
    /// original.
    pub fn split(
        &self,
        path: &Path,
        pairs: &[(String, String)],
    ) -> Result<Vec<PathBuf>, HarnessError> {
        let resolved = self.resolve(path)?;
        let input_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out_dir = path.parent().unwrap_or(Path::new("."));
        split::split_file(&resolved, &input_name, pairs, out_dir)
    }
}
