use necrosim_core::config::SimulationConfig;
use necrosim_core::environment::SimulationEnvironment;
use necrosim_data::{AgentId, AgentKind, Point, Segment};

/// Builds hand-assembled scenarios: an empty arena plus explicitly placed
/// agents and walls.
#[allow(dead_code)]
pub struct EnvironmentBuilder {
    config: SimulationConfig,
    agents: Vec<(Point, AgentKind)>,
    walls: Vec<(Segment, bool)>,
}

#[allow(dead_code)]
impl EnvironmentBuilder {
    pub fn new() -> Self {
        let mut config = SimulationConfig::default();
        config.population.initially_healthy = 0;
        config.population.initially_infected = 0;
        config.population.initially_zombified = 0;
        config.resources.initial_wall_length = 1.0e6;
        config.resources.wall_build_padding = 0.0;
        config.seed = Some(0);
        Self {
            config,
            agents: Vec::new(),
            walls: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimulationConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_agent(mut self, position: Point, kind: AgentKind) -> Self {
        self.agents.push((position, kind));
        self
    }

    pub fn with_wall(mut self, segment: Segment, destructible: bool) -> Self {
        self.walls.push((segment, destructible));
        self
    }

    /// Builds the environment. Returns the ids of the placed agents in
    /// placement order.
    pub fn build(self) -> (SimulationEnvironment, Vec<AgentId>) {
        let mut env =
            SimulationEnvironment::new(self.config).expect("scenario config must be valid");
        for (segment, destructible) in self.walls {
            env.build_wall(segment, destructible)
                .expect("scenario wall must build");
        }
        let ids = self
            .agents
            .into_iter()
            .map(|(position, kind)| env.spawn_agent(position, kind))
            .collect();
        (env, ids)
    }
}

/// Healthy human carrying the given number of bullets.
#[allow(dead_code)]
pub fn armed_human(bullets: u32) -> AgentKind {
    necrosim_core::population::healthy_human(bullets)
}

#[allow(dead_code)]
pub fn unarmed_human() -> AgentKind {
    necrosim_core::population::healthy_human(0)
}
