//! Configuration management for simulation parameters.
//!
//! Strongly-typed configuration structures mapping to `config.toml`. The
//! collaborator layer is responsible for clamping out-of-range values before
//! constructing the engine; [`SimulationConfig::validate`] only enforces the
//! ranges the engine itself relies on.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [grid]
//! rows = 20
//! cols = 20
//! cell_width = 10.0
//!
//! [population]
//! initially_healthy = 50
//! initially_zombified = 5
//!
//! [combat]
//! zombie_win_unarmed = 0.6
//! ```

use serde::{Deserialize, Serialize};

/// Grid dimensions and the inaccessible-cell set.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Cells walled off at construction, as `(row, col)` pairs.
    pub inaccessible: Vec<(usize, usize)>,
}

impl GridConfig {
    pub fn arena_width(&self) -> f64 {
        self.cols as f64 * self.cell_width
    }

    pub fn arena_height(&self) -> f64 {
        self.rows as f64 * self.cell_height
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 20,
            cell_width: 10.0,
            cell_height: 10.0,
            inaccessible: Vec::new(),
        }
    }
}

/// Per-species movement and sensing parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AgentConfig {
    pub agent_width: f64,
    pub agent_height: f64,
    pub human_speed: f64,
    pub zombie_speed: f64,
    /// Wander speed of a zombie with nothing seen or smelled.
    pub zombie_resting_speed: f64,
    pub human_vision: f64,
    pub zombie_vision: f64,
    /// Olfactory radius; ignores wall occlusion.
    pub zombie_smell: f64,
    /// Minimum distance kept between an agent center and any wall.
    pub min_wall_clearance: f64,
}

impl AgentConfig {
    /// Half the diagonal of the agent body rectangle; the wander logic
    /// reflects off walls closer than `speed + half_diagonal`.
    pub fn half_diagonal(&self) -> f64 {
        (self.agent_width * self.agent_width + self.agent_height * self.agent_height).sqrt() / 2.0
    }

    pub fn vision_for(&self, species: necrosim_data::Species) -> f64 {
        match species {
            necrosim_data::Species::Human => self.human_vision,
            necrosim_data::Species::Zombie => self.zombie_vision,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_width: 1.0,
            agent_height: 1.0,
            human_speed: 2.0,
            zombie_speed: 2.0,
            zombie_resting_speed: 1.0,
            human_vision: 30.0,
            zombie_vision: 20.0,
            zombie_smell: 40.0,
            min_wall_clearance: 0.5,
        }
    }
}

/// Combat, infection and ballistics parameters. All ratios are
/// probabilities in [0, 1].
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CombatConfig {
    /// Zombie-wins probability against an unarmed human.
    pub zombie_win_unarmed: f64,
    /// Zombie-wins probability against an armed human.
    pub zombie_win_armed: f64,
    /// Given a zombie win, probability the human dies rather than being
    /// infected.
    pub zombie_kill_vs_infect: f64,
    /// Given a human win, probability the zombie dies rather than escaping.
    pub human_kill_vs_escape: f64,
    /// Phases an infected human survives before zombifying.
    pub latency_phases: u32,
    pub bullets_per_weapon_kit: u32,
    /// Gunshot wounds required to kill an agent.
    pub wound_kill_threshold: u32,
    /// Uniform trajectory deviation half-angle in radians; 0 disables it.
    pub bullet_deviation: f64,
    /// An armed human holds fire instead of fleeing when a bystander blocks
    /// the shot and the zombie is farther than this.
    pub safe_fire_distance: f64,
    /// Resident zombies required for a cell to push down its destructible
    /// walls.
    pub wall_push_zombie_threshold: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            zombie_win_unarmed: 0.6,
            zombie_win_armed: 0.3,
            zombie_kill_vs_infect: 0.4,
            human_kill_vs_escape: 0.5,
            latency_phases: 10,
            bullets_per_weapon_kit: 5,
            wound_kill_threshold: 2,
            bullet_deviation: 0.0,
            safe_fire_distance: 10.0,
            wall_push_zombie_threshold: 3,
        }
    }
}

/// Resource costs and batch sizes for the player economy.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ResourceConfig {
    pub initial_money: u32,
    /// Unit cost zero means unlimited purchase.
    pub vaccine_kit_cost: u32,
    pub weapon_kit_cost: u32,
    pub wall_unit_cost: u32,
    /// Recipients cap when a vaccination kit is used.
    pub vaccinations_per_kit: usize,
    /// Recipients cap when a weapon kit is used.
    pub weapons_per_kit: usize,
    /// Fixed buffer added to both ends of every built wall segment.
    pub wall_build_padding: f64,
    pub initial_wall_length: f64,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            initial_money: 100,
            vaccine_kit_cost: 20,
            weapon_kit_cost: 30,
            wall_unit_cost: 10,
            vaccinations_per_kit: 5,
            weapons_per_kit: 5,
            wall_build_padding: 0.5,
            initial_wall_length: 0.0,
        }
    }
}

/// Initial population per health class.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PopulationConfig {
    pub initially_healthy: usize,
    pub initially_infected: usize,
    pub initially_zombified: usize,
    /// Bullets each initially healthy human starts with.
    pub initial_bullets: u32,
}

impl PopulationConfig {
    pub fn total(&self) -> usize {
        self.initially_healthy + self.initially_infected + self.initially_zombified
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initially_healthy: 50,
            initially_infected: 5,
            initially_zombified: 5,
            initial_bullets: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid: GridConfig,
    pub agents: AgentConfig,
    pub combat: CombatConfig,
    pub resources: ResourceConfig,
    pub population: PopulationConfig,
    pub seed: Option<u64>,
    /// Reseed the RNG every phase from `seed + phase` for reproducible runs.
    pub deterministic: bool,
    /// Minimum delay between phases in the automatic run loop.
    pub phase_delay_ms: u64,
}

impl SimulationConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a
    /// description of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.grid.rows > 0, "Grid rows must be positive");
        anyhow::ensure!(self.grid.cols > 0, "Grid cols must be positive");
        anyhow::ensure!(self.grid.cell_width > 0.0, "Cell width must be positive");
        anyhow::ensure!(self.grid.cell_height > 0.0, "Cell height must be positive");
        for &(row, col) in &self.grid.inaccessible {
            anyhow::ensure!(
                row < self.grid.rows && col < self.grid.cols,
                "Inaccessible cell ({}, {}) outside the grid",
                row,
                col
            );
        }

        anyhow::ensure!(self.agents.agent_width > 0.0, "Agent width must be positive");
        anyhow::ensure!(
            self.agents.agent_height > 0.0,
            "Agent height must be positive"
        );
        anyhow::ensure!(
            self.agents.agent_width < self.grid.cell_width
                && self.agents.agent_height < self.grid.cell_height,
            "Agent body must fit inside a grid cell"
        );
        anyhow::ensure!(self.agents.human_speed >= 0.0, "Human speed must be non-negative");
        anyhow::ensure!(
            self.agents.zombie_speed >= 0.0,
            "Zombie speed must be non-negative"
        );
        anyhow::ensure!(
            self.agents.zombie_resting_speed >= 0.0,
            "Zombie resting speed must be non-negative"
        );
        anyhow::ensure!(self.agents.human_vision > 0.0, "Human vision must be positive");
        anyhow::ensure!(
            self.agents.zombie_vision > 0.0,
            "Zombie vision must be positive"
        );
        anyhow::ensure!(self.agents.zombie_smell > 0.0, "Zombie smell must be positive");
        anyhow::ensure!(
            self.agents.min_wall_clearance >= 0.0,
            "Wall clearance must be non-negative"
        );

        for (name, ratio) in [
            ("zombie_win_unarmed", self.combat.zombie_win_unarmed),
            ("zombie_win_armed", self.combat.zombie_win_armed),
            ("zombie_kill_vs_infect", self.combat.zombie_kill_vs_infect),
            ("human_kill_vs_escape", self.combat.human_kill_vs_escape),
        ] {
            anyhow::ensure!(
                (0.0..=1.0).contains(&ratio),
                "{} must be in [0.0, 1.0]",
                name
            );
        }
        anyhow::ensure!(self.combat.latency_phases > 0, "Latency must be positive");
        anyhow::ensure!(
            self.combat.wound_kill_threshold > 0,
            "Wound kill threshold must be positive"
        );
        anyhow::ensure!(
            (0.0..=std::f64::consts::PI).contains(&self.combat.bullet_deviation),
            "Bullet deviation must be in [0, pi]"
        );
        anyhow::ensure!(
            self.combat.wall_push_zombie_threshold > 0,
            "Wall push threshold must be positive"
        );

        anyhow::ensure!(
            self.resources.vaccinations_per_kit > 0,
            "Vaccinations per kit must be positive"
        );
        anyhow::ensure!(
            self.resources.weapons_per_kit > 0,
            "Weapons per kit must be positive"
        );
        anyhow::ensure!(
            self.resources.wall_build_padding >= 0.0,
            "Wall padding must be non-negative"
        );
        anyhow::ensure!(
            self.resources.initial_wall_length >= 0.0,
            "Initial wall length must be non-negative"
        );

        let accessible = self.grid.rows * self.grid.cols
            - self
                .grid
                .inaccessible
                .iter()
                .collect::<std::collections::HashSet<_>>()
                .len();
        anyhow::ensure!(
            self.population.total() <= accessible,
            "Population of {} cannot fit {} accessible cells",
            self.population.total(),
            accessible
        );

        Ok(())
    }

    /// Loads and validates configuration from a `config.toml` string.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }
}
