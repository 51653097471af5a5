//! Shared test model: a tiny growth model with agents, list results,
//! and a friendship network, wired through the field registry the same
//! way a real model would be.

use sweep_harness_core_rs::{
    join_list, BindOutcome, EdgeRecord, FieldKind, FieldRegistry, RngManager, SimulationModel,
};

pub struct AgentState {
    pub energy: f64,
    pub memory: Vec<i64>,
}

#[derive(Default)]
pub struct ModelState {
    pub num_agents: i64,
    pub growth: f64,
    pub label: String,
    pub track: bool,
    /// Index of an agent slot left empty, -1 for none.
    pub gap_slot: i64,
    /// Engine signals exhaustion at this step, 0 for never.
    pub exhaust_at: i64,
    pub total: f64,
    pub history: Vec<f64>,
    pub friends: Vec<(usize, usize)>,
}

/// Snapshot taken at every `start()`, for asserting enumeration order
/// and replication seeding.
pub struct StartRecord {
    /// RNG state as seeded for this replication.
    pub rng_state: u64,
    pub num_agents: i64,
    pub growth: f64,
    pub label: String,
}

pub struct TestModel {
    pub state: ModelState,
    registry: FieldRegistry<ModelState>,
    agent_registry: FieldRegistry<AgentState>,
    pub agents: Vec<Option<AgentState>>,
    rng: RngManager,
    steps: u64,
    pub starts: Vec<StartRecord>,
    pub bind_events: u64,
}

impl TestModel {
    pub fn new() -> Self {
        let registry = FieldRegistry::new()
            .int("num_agents", |s: &ModelState| s.num_agents, |s, v| s.num_agents = v)
            .double("growth", |s: &ModelState| s.growth, |s, v| s.growth = v)
            .string(
                "label",
                |s: &ModelState| s.label.clone(),
                |s, v| s.label = v,
            )
            .boolean("track", |s: &ModelState| s.track, |s, v| s.track = v)
            .int("gap_slot", |s: &ModelState| s.gap_slot, |s, v| s.gap_slot = v)
            .int(
                "exhaust_at",
                |s: &ModelState| s.exhaust_at,
                |s, v| s.exhaust_at = v,
            )
            .double("total", |s: &ModelState| s.total, |s, v| s.total = v)
            .list("history", |s: &ModelState| join_list(&s.history))
            .network("friends", |s: &ModelState| {
                s.friends
                    .iter()
                    .map(|&(a, b)| EdgeRecord {
                        from: format!("agent{}", a),
                        to: format!("agent{}", b),
                        info: "friend".to_string(),
                    })
                    .collect()
            });
        let agent_registry = FieldRegistry::new()
            .double("energy", |a: &AgentState| a.energy, |a, v| a.energy = v)
            .list("memory", |a: &AgentState| join_list(&a.memory));

        Self {
            state: ModelState {
                gap_slot: -1,
                ..Default::default()
            },
            registry,
            agent_registry,
            agents: Vec::new(),
            rng: RngManager::new(0),
            steps: 0,
            starts: Vec::new(),
            bind_events: 0,
        }
    }
}

impl Default for TestModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationModel for TestModel {
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
        self.bind_events += 1;
        self.registry
            .bind(&mut self.state, name, value, &mut self.rng)
    }

    fn read_result(&self, name: &str) -> String {
        self.registry.read(&self.state, name).unwrap_or_default()
    }

    fn agent_count(&self) -> usize {
        self.agents.len()
    }

    fn agent_label(&self, idx: usize) -> Option<String> {
        self.agents[idx].as_ref().map(|_| format!("agent{}", idx))
    }

    fn read_agent_result(&self, idx: usize, name: &str) -> String {
        self.agents[idx]
            .as_ref()
            .and_then(|a| self.agent_registry.read(a, name))
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
        self.state.history.clear();
        let n = self.state.num_agents.max(0) as usize;
        self.agents = (0..n)
            .map(|i| {
                if i as i64 == self.state.gap_slot {
                    None
                } else {
                    Some(AgentState {
                        energy: 0.0,
                        memory: Vec::new(),
                    })
                }
            })
            .collect();
        self.state.friends = (1..n).map(|i| (i - 1, i)).collect();
        self.starts.push(StartRecord {
            rng_state: self.rng.get_state(),
            num_agents: self.state.num_agents,
            growth: self.state.growth,
            label: self.state.label.clone(),
        });
    }

    fn step(&mut self) -> bool {
        self.steps += 1;
        self.state.total += self.state.growth;
        self.state.history.push(self.state.total);
        for agent in self.agents.iter_mut().flatten() {
            agent.energy += self.state.growth;
            agent.memory.push(self.steps as i64);
        }
        !(self.state.exhaust_at > 0 && self.steps >= self.state.exhaust_at as u64)
    }

    fn step_count(&self) -> u64 {
        self.steps
    }
}

/// Write an input file into `dir` and return its path.
pub fn write_spec(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write spec file");
    path
}
