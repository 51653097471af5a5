//! Demonstration model: agents on a one-dimensional random walk with a
//! randomly wired friendship network.
//!
//! Every field the harness can set or collect goes through the registry,
//! so a generated template, a sweep over `drift`, or an exported
//! `friends` edge list all work out of the box.

use sweep_harness_core_rs::sampler::standard_normal;
use sweep_harness_core_rs::{
    join_list, BindOutcome, EdgeRecord, FieldKind, FieldRegistry, RngManager, SimulationModel,
};

pub struct Walker {
    position: f64,
    path: Vec<f64>,
}

#[derive(Default)]
pub struct DemoState {
    /// Number of walkers created at start.
    num_agents: i64,
    /// Standard deviation of each per-step displacement.
    walk_sd: f64,
    /// Constant displacement added every step.
    drift: f64,
    /// Probability that any ordered pair of walkers is befriended.
    link_prob: f64,
    /// Mean walker position (collectable result).
    mean_position: f64,
    /// Largest distance any walker has reached from the origin.
    extent: f64,
    /// Timecourse of the mean position (collectable list).
    trace: Vec<f64>,
    friends: Vec<(usize, usize)>,
}

pub struct DemoModel {
    state: DemoState,
    registry: FieldRegistry<DemoState>,
    agent_registry: FieldRegistry<Walker>,
    walkers: Vec<Walker>,
    rng: RngManager,
    steps: u64,
}

impl DemoModel {
    pub fn new() -> Self {
        let registry = FieldRegistry::new()
            .int(
                "num_agents",
                |s: &DemoState| s.num_agents,
                |s, v| s.num_agents = v,
            )
            .double("walk_sd", |s: &DemoState| s.walk_sd, |s, v| s.walk_sd = v)
            .double("drift", |s: &DemoState| s.drift, |s, v| s.drift = v)
            .double(
                "link_prob",
                |s: &DemoState| s.link_prob,
                |s, v| s.link_prob = v,
            )
            .double(
                "mean_position",
                |s: &DemoState| s.mean_position,
                |s, v| s.mean_position = v,
            )
            .double("extent", |s: &DemoState| s.extent, |s, v| s.extent = v)
            .list("trace", |s: &DemoState| join_list(&s.trace))
            .network("friends", |s: &DemoState| {
                s.friends
                    .iter()
                    .map(|&(a, b)| EdgeRecord {
                        from: format!("walker{}", a),
                        to: format!("walker{}", b),
                        info: String::new(),
                    })
                    .collect()
            });
        let agent_registry = FieldRegistry::new()
            .double("position", |w: &Walker| w.position, |w, v| w.position = v)
            .list("path", |w: &Walker| join_list(&w.path));

        Self {
            state: DemoState {
                num_agents: 10,
                walk_sd: 1.0,
                link_prob: 0.1,
                ..Default::default()
            },
            registry,
            agent_registry,
            walkers: Vec::new(),
            rng: RngManager::new(0),
            steps: 0,
        }
    }
}

impl Default for DemoModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationModel for DemoModel {
    fn param_names(&self) -> Vec<String> {
        self.registry.template_names()
    }

    fn agent_param_names(&self) -> Vec<String> {
        self.agent_registry.template_names()
    }

    fn network_names(&self) -> Vec<String> {
        self.registry.network_names()
    }

    fn field_kind(&self, name: &str) -> FieldKind {
        self.registry.kind(name)
    }

    fn agent_field_kind(&self, name: &str) -> FieldKind {
        self.agent_registry.kind(name)
    }

    fn bind_field(&mut self, name: &str, value: &str) -> BindOutcome {
        self.registry
            .bind(&mut self.state, name, value, &mut self.rng)
    }

    fn read_result(&self, name: &str) -> String {
        self.registry.read(&self.state, name).unwrap_or_default()
    }

    fn agent_count(&self) -> usize {
        self.walkers.len()
    }

    fn agent_label(&self, idx: usize) -> Option<String> {
        Some(format!("walker{}", idx))
    }

    fn read_agent_result(&self, idx: usize, name: &str) -> String {
        self.agent_registry
            .read(&self.walkers[idx], name)
            .unwrap_or_default()
    }

    fn network_edges(&self, name: &str) -> Option<Vec<EdgeRecord>> {
        self.registry.read_edges(&self.state, name)
    }

    fn rng_mut(&mut self) -> &mut RngManager {
        &mut self.rng
    }

    fn start(&mut self) {
        self.steps = 0;
        self.state.trace.clear();
        self.state.extent = 0.0;

        let n = self.state.num_agents.max(0) as usize;
        self.walkers = (0..n)
            .map(|_| Walker {
                position: 0.0,
                path: Vec::new(),
            })
            .collect();

        self.state.friends.clear();
        for a in 0..n {
            for b in 0..n {
                if a != b && self.rng.next_f64() < self.state.link_prob {
                    self.state.friends.push((a, b));
                }
            }
        }
    }

    fn step(&mut self) -> bool {
        self.steps += 1;
        let mut sum = 0.0;
        for walker in &mut self.walkers {
            walker.position +=
                standard_normal(&mut self.rng) * self.state.walk_sd + self.state.drift;
            walker.path.push(walker.position);
            sum += walker.position;
            if walker.position.abs() > self.state.extent {
                self.state.extent = walker.position.abs();
            }
        }
        if !self.walkers.is_empty() {
            self.state.mean_position = sum / self.walkers.len() as f64;
        }
        self.state.trace.push(self.state.mean_position);
        true
    }

    fn step_count(&self) -> u64 {
        self.steps
    }
}
