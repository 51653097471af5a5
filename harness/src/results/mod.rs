//! Multi-channel results writer.
//!
//! Streams rows to up to six categories of output file, each
//! independently interval-gated:
//!
//! | channel      | file                         | gate                        |
//! |--------------|------------------------------|-----------------------------|
//! | end          | `<fname>endresults.txt`      | once, run end               |
//! | timecourse   | `<fname>timeresults.txt`     | every `testint` steps       |
//! | agent        | `<fname>agentresults.txt`    | every `agentint` (0 = every test step) |
//! | model lists  | `<fname>listresults.txt`     | every `listint`             |
//! | agent lists  | `<fname>agentlistresults.txt`| every `listint`             |
//! | edge lists   | `<fname><net>edgelist.txt`   | every `netint`, one per net |
//!
//! Every row starts with the seed, then (except on the end channel) the
//! step, then the current values of every Random parameter and every
//! Swept parameter in declaration order, then channel-specific columns.
//! A channel's file is opened once for the whole sweep, append-only, and
//! its generated header precedes all data rows. A mid-run write failure
//! is logged and the run continues; only setup failures are fatal.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::error::HarnessError;
use crate::model::SimulationModel;
use crate::params::{ParamRole, ParamTable, ResolvedExperiment};

/// Rows written per channel over a run set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelCounts {
    pub end: u64,
    pub timecourse: u64,
    pub agent: u64,
    pub model_list: u64,
    pub agent_list: u64,
    pub network: u64,
}

struct Channel {
    writer: BufWriter<File>,
    rows: u64,
}

impl Channel {
    fn create(path: PathBuf) -> Result<Self, HarnessError> {
        let file = File::create(&path).map_err(|source| HarnessError::OutputFile {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            rows: 0,
        })
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{}", line) {
            warn!(error = %e, "failed to write results row");
        }
    }

    fn write_row(&mut self, sep: char, fields: &[String]) {
        self.write_line(&fields.join(&sep.to_string()));
        self.rows += 1;
    }
}

/// Owns every open output channel for one run set.
pub struct ResultsWriter {
    resolved: ResolvedExperiment,
    end: Option<Channel>,
    time: Option<Channel>,
    agent: Option<Channel>,
    model_list: Option<Channel>,
    agent_list: Option<Channel>,
    nets: Vec<(String, Channel)>,
}

impl ResultsWriter {
    /// Open every active channel and write its header.
    ///
    /// A channel is active only when its declared result set is
    /// non-empty. Headers capture the base parameter values as they
    /// stand at open time.
    pub fn open(
        resolved: &ResolvedExperiment,
        table: &ParamTable,
    ) -> Result<ResultsWriter, HarnessError> {
        let fname = &resolved.settings.fname;
        let mut writer = ResultsWriter {
            resolved: resolved.clone(),
            end: None,
            time: None,
            agent: None,
            model_list: None,
            agent_list: None,
            nets: Vec::new(),
        };

        if !resolved.model_results.is_empty() {
            let mut end = Channel::create(PathBuf::from(format!("{}endresults.txt", fname)))?;
            let mut time = Channel::create(PathBuf::from(format!("{}timeresults.txt", fname)))?;
            let res: Vec<&str> = resolved.model_results.iter().map(String::as_str).collect();
            writer.write_header(&mut end, table, false, false, &res);
            writer.write_header(&mut time, table, true, false, &res);
            writer.end = Some(end);
            writer.time = Some(time);
        }
        if !resolved.agent_results.is_empty() {
            let mut agent = Channel::create(PathBuf::from(format!("{}agentresults.txt", fname)))?;
            let res: Vec<&str> = resolved.agent_results.iter().map(String::as_str).collect();
            writer.write_header(&mut agent, table, true, true, &res);
            writer.agent = Some(agent);
        }
        if !resolved.model_lists.is_empty() {
            let mut list = Channel::create(PathBuf::from(format!("{}listresults.txt", fname)))?;
            writer.write_header(&mut list, table, true, false, &["List", "Values"]);
            writer.model_list = Some(list);
        }
        if !resolved.agent_lists.is_empty() {
            let mut list =
                Channel::create(PathBuf::from(format!("{}agentlistresults.txt", fname)))?;
            writer.write_header(&mut list, table, true, true, &["List", "Values"]);
            writer.agent_list = Some(list);
        }
        for net in &resolved.networks {
            let mut chan = Channel::create(PathBuf::from(format!("{}{}edgelist.txt", fname, net)))?;
            writer.write_header(&mut chan, table, true, false, &["from", "to", "info"]);
            writer.nets.push((net.clone(), chan));
        }

        Ok(writer)
    }

    /// Generated header: base parameter values, random parameters with
    /// their distribution codes, swept parameters with their full value
    /// lists, then the column-label row matching the row layout.
    fn write_header(
        &self,
        chan: &mut Channel,
        table: &ParamTable,
        time: bool,
        agent: bool,
        res: &[&str],
    ) {
        let r = &self.resolved;

        let base: Vec<String> = r
            .specs
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{} = {}", s.name, table.get(i)))
            .collect();
        chan.write_line(&format!("% Base Parameters: {}", base.join(", ")));

        chan.write_line("% Random Parameters:");
        for i in r.random_indices() {
            if let ParamRole::Random(code) = &r.specs[i].role {
                chan.write_line(&format!("% {} = {}", r.specs[i].name, code));
            }
        }
        chan.write_line("% Test Parameters:");
        for i in r.swept_indices() {
            if let ParamRole::Swept(values) = &r.specs[i].role {
                chan.write_line(&format!("% {} = [{}]", r.specs[i].name, values.join(", ")));
            }
        }

        let mut labels: Vec<String> = vec!["Seed".to_string()];
        if time {
            labels.push("Timestep".to_string());
        }
        for i in r.random_indices() {
            labels.push(r.specs[i].name.clone());
        }
        for i in r.swept_indices() {
            labels.push(r.specs[i].name.clone());
        }
        if agent {
            labels.push("AgentID".to_string());
            labels.push("Agent".to_string());
        }
        labels.extend(res.iter().map(|s| s.to_string()));
        chan.write_line(&labels.join(&r.settings.sep.to_string()));
    }

    /// Emit one interval's worth of rows across every active channel.
    ///
    /// `prefix` holds the current Random then Swept parameter values in
    /// declaration order. `end` additionally flushes to the end channel.
    pub fn write_results(
        &mut self,
        model: &dyn SimulationModel,
        seed: u64,
        prefix: &[String],
        end: bool,
    ) {
        let sep = self.resolved.settings.sep;
        let step = model.step_count();

        // whole-model scalar results feed both the timecourse and, at
        // run end, the end channel
        if !self.resolved.model_results.is_empty() {
            let res: Vec<String> = self
                .resolved
                .model_results
                .iter()
                .map(|r| model.read_result(r))
                .collect();

            if let Some(time) = &mut self.time {
                let mut row = vec![seed.to_string(), step.to_string()];
                row.extend_from_slice(prefix);
                row.extend(res.iter().cloned());
                time.write_row(sep, &row);
            }
            if end {
                if let Some(chan) = &mut self.end {
                    let mut row = vec![seed.to_string()];
                    row.extend_from_slice(prefix);
                    row.extend(res);
                    chan.write_row(sep, &row);
                }
            }
        }

        let agentint = self.resolved.settings.agentint;
        if self.agent.is_some() && (agentint == 0 || step % agentint == 0) {
            let names = self.resolved.agent_results.clone();
            let chan = self.agent.as_mut().expect("agent channel open");
            for idx in 0..model.agent_count() {
                // empty slots produce no row
                let label = match model.agent_label(idx) {
                    Some(l) => l,
                    None => continue,
                };
                let mut row = vec![seed.to_string(), step.to_string()];
                row.extend_from_slice(prefix);
                row.push(idx.to_string());
                row.push(label);
                row.extend(names.iter().map(|r| model.read_agent_result(idx, r)));
                chan.write_row(sep, &row);
            }
        }

        let netint = self.resolved.settings.netint;
        if !self.nets.is_empty() && (netint == 0 || step % netint == 0) {
            for (name, chan) in &mut self.nets {
                let edges = match model.network_edges(name) {
                    Some(edges) => edges,
                    None => {
                        warn!(network = %name, "cannot access network; skipped for this interval");
                        continue;
                    }
                };
                for edge in edges {
                    let mut row = vec![seed.to_string(), step.to_string()];
                    row.extend_from_slice(prefix);
                    row.push(edge.from);
                    row.push(edge.to);
                    row.push(edge.info);
                    chan.write_row(sep, &row);
                }
            }
        }

        let listint = self.resolved.settings.listint;
        if listint == 0 || step % listint == 0 {
            if let Some(chan) = &mut self.model_list {
                for name in &self.resolved.model_lists {
                    let mut row = vec![seed.to_string(), step.to_string()];
                    row.extend_from_slice(prefix);
                    row.push(name.clone());
                    row.push(model.read_result(name));
                    chan.write_row(sep, &row);
                }
            }
            if let Some(chan) = &mut self.agent_list {
                for name in &self.resolved.agent_lists {
                    for idx in 0..model.agent_count() {
                        let label = match model.agent_label(idx) {
                            Some(l) => l,
                            None => continue,
                        };
                        let mut row = vec![seed.to_string(), step.to_string()];
                        row.extend_from_slice(prefix);
                        row.push(idx.to_string());
                        row.push(label);
                        row.push(name.clone());
                        row.push(model.read_agent_result(idx, name));
                        chan.write_row(sep, &row);
                    }
                }
            }
        }
    }

    /// Flush every open channel. Called once when the run set completes.
    pub fn flush(&mut self) {
        let mut channels: Vec<&mut Channel> = Vec::new();
        channels.extend(self.end.as_mut());
        channels.extend(self.time.as_mut());
        channels.extend(self.agent.as_mut());
        channels.extend(self.model_list.as_mut());
        channels.extend(self.agent_list.as_mut());
        channels.extend(self.nets.iter_mut().map(|(_, c)| c));
        for chan in channels {
            if let Err(e) = chan.writer.flush() {
                warn!(error = %e, "results channel failed to flush");
            }
        }
    }

    /// Rows written so far, per channel.
    pub fn counts(&self) -> ChannelCounts {
        ChannelCounts {
            end: self.end.as_ref().map_or(0, |c| c.rows),
            timecourse: self.time.as_ref().map_or(0, |c| c.rows),
            agent: self.agent.as_ref().map_or(0, |c| c.rows),
            model_list: self.model_list.as_ref().map_or(0, |c| c.rows),
            agent_list: self.agent_list.as_ref().map_or(0, |c| c.rows),
            network: self.nets.iter().map(|(_, c)| c.rows).sum(),
        }
    }
}
