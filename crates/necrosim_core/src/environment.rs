//! Simulation environment orchestrator.
//!
//! Owns the grid, the population registry, the wall store and the resource
//! economy, and drives one discrete phase:
//! perceive -> decide -> apply-moves -> resolve-conflicts ->
//! advance-infections -> breach-walls -> resolve-shots.
//!
//! Perceptions for every agent are computed against the pre-phase state
//! before any action is applied, so no agent observes another agent's
//! post-move position within the same phase. The perception pass is
//! read-only and runs in parallel; every mutation happens serially
//! afterwards, in ascending agent-id order.

use crate::agent::{self, Action};
use crate::config::SimulationConfig;
use crate::economy::{self, Resources};
use crate::geometry::{self, EPS};
use crate::grid::SpatialGrid;
use crate::metrics::Metrics;
use crate::perception::{self, Perception};
use crate::population::{healthy_human, infected_human, PopulationRegistry};
use crate::snapshot::{AgentSnapshot, PhaseSnapshot};
use crate::vector::VectorOps;
use crate::walls::WallStore;
use anyhow::{Context, Result};
use necrosim_data::{
    AgentId, AgentKind, Point, Rect, Segment, ShotRecord, Vec2, Wall, WallId,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Termination state of the simulation.
///
/// `HumansPrevail` requires that an infection was seeded at construction:
/// a run that never contained an infected or zombified agent stays
/// `Ongoing` indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    HumansPrevail,
    ZombiesPrevail,
}

pub struct SimulationEnvironment {
    config: SimulationConfig,
    grid: SpatialGrid,
    registry: PopulationRegistry,
    walls: WallStore,
    resources: Resources,
    /// Shots fired this phase, shortened to their impact points after
    /// resolution. Cleared at the start of the next phase.
    shots: Vec<ShotRecord>,
    rng: ChaCha8Rng,
    seed: u64,
    phase: u64,
    arena: Rect,
    metrics: Metrics,
    infection_seeded: bool,
}

impl SimulationEnvironment {
    /// Builds the arena, borders and initial population. Population
    /// placement that cannot fit the configured grid is a fatal
    /// configuration error surfaced here, before the simulation starts.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config
            .validate()
            .context("invalid simulation configuration")?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = SpatialGrid::new(&config.grid);
        let arena = Rect::new(
            Point::ORIGIN,
            Point::new(config.grid.arena_width(), config.grid.arena_height()),
        );
        let mut walls = WallStore::new();
        walls.build_boundaries(&mut grid, &arena);
        let resources = Resources::new(&config.resources);
        let infection_seeded =
            config.population.initially_infected + config.population.initially_zombified > 0;

        let mut env = Self {
            config,
            grid,
            registry: PopulationRegistry::new(),
            walls,
            resources,
            shots: Vec::new(),
            rng,
            seed,
            phase: 0,
            arena,
            metrics: Metrics::new(),
            infection_seeded,
        };
        env.seed_population()?;

        let counts = env.registry.counts();
        tracing::info!(
            seed = env.seed,
            healthy = counts.healthy,
            infected = counts.infected,
            zombified = counts.zombified,
            "Simulation environment initialized"
        );
        Ok(env)
    }

    /// Places the initial population on distinct accessible cells, each
    /// agent at its cell's center, in shuffled cell order.
    fn seed_population(&mut self) -> Result<()> {
        let mut cells = self.grid.accessible_cells();
        cells.shuffle(&mut self.rng);
        let population = self.config.population.clone();
        anyhow::ensure!(
            cells.len() >= population.total(),
            "population of {} cannot fit {} accessible cells",
            population.total(),
            cells.len()
        );

        let mut slots = cells.into_iter();
        let mut place = |env: &mut Self, kind: AgentKind| -> Result<()> {
            let (row, col) = slots.next().context("ran out of spawn cells")?;
            let position = Point::new(
                (col as f64 + 0.5) * env.grid.cell_width,
                (row as f64 + 0.5) * env.grid.cell_height,
            );
            env.spawn_agent(position, kind);
            Ok(())
        };

        let latency = self.config.combat.latency_phases;
        for _ in 0..population.initially_healthy {
            place(self, healthy_human(population.initial_bullets))?;
        }
        for _ in 0..population.initially_infected {
            place(self, infected_human(latency))?;
        }
        for _ in 0..population.initially_zombified {
            place(self, AgentKind::Zombie)?;
        }
        Ok(())
    }

    /// Registers a live agent in both the registry and the grid. Also used
    /// by tests to assemble hand-built scenarios.
    pub fn spawn_agent(&mut self, position: Point, kind: AgentKind) -> AgentId {
        let id = self.registry.spawn(position, kind);
        self.grid.insert_agent(id, &position);
        id
    }

    /// Advances the simulation by one phase.
    pub fn step_phase(&mut self) {
        let start = Instant::now();
        if self.config.deterministic {
            self.rng = ChaCha8Rng::seed_from_u64(
                self.seed.wrapping_add(self.phase).wrapping_add(0x5EED),
            );
        }
        self.shots.clear();

        let walls = self.walls.all();
        let ids = self.registry.ids();

        // Read-only pass over the pre-phase state.
        let perceptions: Vec<(AgentId, Perception)> = ids
            .par_iter()
            .filter_map(|&id| {
                let record = self.registry.get(id)?;
                Some((
                    id,
                    perception::perceive(
                        record,
                        &self.registry,
                        &self.grid,
                        &walls,
                        &self.config.agents,
                    ),
                ))
            })
            .collect();

        let mut actions = Vec::with_capacity(perceptions.len());
        for (id, perception) in &perceptions {
            let Some(record) = self.registry.get(*id) else {
                continue;
            };
            actions.push((
                *id,
                agent::decide(
                    record,
                    perception,
                    &self.config.agents,
                    &self.config.combat,
                    &mut self.rng,
                ),
            ));
        }

        for (id, action) in actions {
            match action {
                Action::Move(velocity) => self.apply_move(id, velocity),
                Action::Shoot(aim) => self.apply_shot(id, aim),
                Action::Stay => {}
            }
        }

        self.resolve_conflicts();
        self.advance_infections();
        self.breach_walls();
        self.resolve_shots();

        self.phase += 1;
        let counts = self.registry.counts();
        self.metrics
            .record_phase(start.elapsed(), counts.humans(), counts.zombified);
        #[cfg(debug_assertions)]
        self.registry.assert_counts_consistent();
    }

    /// Applies a decided move: clamp travel short of the nearest wall in the
    /// heading, clamp into the arena's agent-valid bounds, reindex the grid
    /// cell atomically.
    fn apply_move(&mut self, id: AgentId, velocity: Vec2) {
        if velocity.is_zero() {
            return;
        }
        let Some(record) = self.registry.get(id) else {
            return;
        };
        let origin = record.position;
        let speed = velocity.magnitude();
        let dir = velocity.normalized();
        let clearance = self.config.agents.min_wall_clearance;

        let reach = speed + clearance;
        let probe = Segment::new(origin, origin.offset(dir * reach));
        let mut nearest: Option<f64> = None;
        for wall in self.walls.iter() {
            if let Some(hit) = geometry::segment_intersection(&probe, &wall.segment) {
                let d = origin.distance_to(&hit);
                if nearest.map_or(true, |b| d < b) {
                    nearest = Some(d);
                }
            }
        }
        let travel = match nearest {
            // Already inside the clearance zone: no advance.
            Some(d) => (d - clearance).max(0.0).min(speed),
            None => speed,
        };

        let half_w = self.config.agents.agent_width / 2.0;
        let half_h = self.config.agents.agent_height / 2.0;
        let raw = origin.offset(dir * travel);
        let target = Point::new(
            raw.x.clamp(half_w, self.arena.max.x - half_w),
            raw.y.clamp(half_h, self.arena.max.y - half_h),
        );

        self.grid.move_agent(id, &origin, &target);
        if let Some(record) = self.registry.get_mut(id) {
            record.position = target;
            record.heading = dir;
        }
    }

    /// Applies a decided shot: deviate the aim, extend across the arena
    /// diagonal, clip to arena bounds, consume one bullet and record the
    /// trajectory for the resolution step. A shot with zero bullets is a
    /// no-op.
    fn apply_shot(&mut self, id: AgentId, aim: Vec2) {
        if aim.is_zero() {
            return;
        }
        let Some(record) = self.registry.get(id) else {
            return;
        };
        let can_fire = record.kind.as_human().is_some_and(|h| h.is_armed());
        if !can_fire {
            return;
        }
        let origin = record.position;

        let mut dir = aim.normalized();
        let deviation = self.config.combat.bullet_deviation;
        if deviation > 0.0 {
            dir.rotate(self.rng.gen_range(-deviation..=deviation));
        }
        let diagonal =
            (self.arena.width() * self.arena.width() + self.arena.height() * self.arena.height())
                .sqrt();
        let ray = Segment::new(origin, origin.offset(dir * diagonal));
        let Some(clipped) = geometry::clip_segment(&self.arena, &ray) else {
            return;
        };

        if let Some(human) = self
            .registry
            .get_mut(id)
            .and_then(|r| r.kind.as_human_mut())
        {
            human.bullets -= 1;
        }
        self.shots.push(ShotRecord {
            shooter: id,
            segment: clipped,
        });
        self.metrics.increment_counter("shots_fired");
    }

    /// Melee resolution. Per cell, co-located agents partition into groups
    /// separated by walls; each group with both species pairs humans against
    /// zombies round-robin. Kill decisions are collected first and applied
    /// after the pairing loop.
    fn resolve_conflicts(&mut self) {
        let walls = self.walls.all();
        let cells: Vec<(usize, usize)> = self.grid.all_cells().collect();

        for (row, col) in cells {
            let mut ids: Vec<AgentId> = self.grid.agents_in(row, col).to_vec();
            if ids.len() < 2 {
                continue;
            }
            ids.sort_unstable();

            // Union-by-representative: join the first group whose
            // representative is in line of sight, else start a new one.
            // Infected humans cannot fight and never join a group.
            let mut groups: Vec<Vec<AgentId>> = Vec::new();
            for id in ids {
                let Some(record) = self.registry.get(id) else {
                    continue;
                };
                if record.is_infected_human() {
                    continue;
                }
                let position = record.position;
                let mut joined = false;
                for group in &mut groups {
                    let Some(rep) = group.first().and_then(|&r| self.registry.get(r)) else {
                        continue;
                    };
                    if perception::sight_clear(&position, &rep.position, &walls) {
                        group.push(id);
                        joined = true;
                        break;
                    }
                }
                if !joined {
                    groups.push(vec![id]);
                }
            }

            for group in groups {
                self.resolve_group(&group);
            }
        }
    }

    fn resolve_group(&mut self, group: &[AgentId]) {
        let mut humans = Vec::new();
        let mut zombies = Vec::new();
        for &id in group {
            match self.registry.get(id) {
                Some(r) if r.is_zombie() => zombies.push(id),
                Some(_) => humans.push(id),
                None => {}
            }
        }
        if humans.is_empty() || zombies.is_empty() {
            return;
        }

        let combat = self.config.combat.clone();
        let mut killed: Vec<AgentId> = Vec::new();
        let mut alive_zombies = zombies;
        let mut next = 0usize;

        for &human_id in &humans {
            // No zombies left: the remaining humans in this group see no
            // combat this phase.
            if alive_zombies.is_empty() {
                break;
            }
            let zombie_id = alive_zombies[next % alive_zombies.len()];
            next += 1;

            let armed = self
                .registry
                .get(human_id)
                .and_then(|r| r.kind.as_human())
                .is_some_and(|h| h.is_armed());
            let win_ratio = if armed {
                combat.zombie_win_armed
            } else {
                combat.zombie_win_unarmed
            };

            if self.rng.gen::<f64>() < win_ratio {
                if self.rng.gen::<f64>() < combat.zombie_kill_vs_infect {
                    killed.push(human_id);
                } else {
                    // No-op for vaccinated humans; immunity covers
                    // infection, not death.
                    self.registry.infect(human_id, combat.latency_phases);
                }
            } else if self.rng.gen::<f64>() < combat.human_kill_vs_escape {
                if armed {
                    if let Some(h) = self
                        .registry
                        .get_mut(human_id)
                        .and_then(|r| r.kind.as_human_mut())
                    {
                        h.bullets = h.bullets.saturating_sub(1);
                    }
                }
                killed.push(zombie_id);
                alive_zombies.retain(|&z| z != zombie_id);
            }
        }

        for id in killed {
            if let Some(position) = self.registry.kill(id) {
                self.grid.remove_agent(id, &position);
                self.metrics.increment_counter("melee_deaths");
            }
        }
    }

    /// Decrements every infected human's latency; expired humans are
    /// replaced in place by a fresh zombie identity in the same grid cell.
    fn advance_infections(&mut self) {
        for id in self.registry.tick_latencies() {
            let Some(position) = self.registry.get(id).map(|r| r.position) else {
                continue;
            };
            if let Some(new_id) = self.registry.zombify(id) {
                self.grid.remove_agent(id, &position);
                self.grid.insert_agent(new_id, &position);
                self.metrics.increment_counter("zombifications");
                tracing::debug!(retired = id.0, zombie = new_id.0, "Latency expired");
            }
        }
    }

    /// Every cell whose resident zombie count meets the push threshold and
    /// which indexes at least one destructible wall has those walls' portions
    /// inside the cell removed.
    fn breach_walls(&mut self) {
        let threshold = self.config.combat.wall_push_zombie_threshold;
        let cells: Vec<(usize, usize)> = self.grid.all_cells().collect();
        for (row, col) in cells {
            if self.grid.walls_in(row, col).is_empty() {
                continue;
            }
            let zombies = self
                .grid
                .agents_in(row, col)
                .iter()
                .filter(|&&id| self.registry.get(id).is_some_and(|r| r.is_zombie()))
                .count();
            if zombies < threshold {
                continue;
            }
            let rect = self.grid.cell_rect(row, col);
            let removed = self.walls.breach_cell(row, col, &rect, &mut self.grid);
            if removed > EPS {
                self.metrics.increment_counter("walls_breached");
                tracing::debug!(row, col, removed, "Zombies pushed down walls");
            }
        }
    }

    /// Walks each recorded shot cell-by-cell and applies its impact on the
    /// nearest agent whose body rectangle the trajectory crosses. The stored
    /// segment is shortened to the impact point.
    fn resolve_shots(&mut self) {
        let combat = self.config.combat.clone();
        let shots = std::mem::take(&mut self.shots);
        let mut resolved = Vec::with_capacity(shots.len());

        for mut shot in shots {
            if let Some((target, impact)) = self.find_shot_impact(&shot) {
                shot.segment.b = impact;
                if self.registry.wound(target, &combat) {
                    if let Some(position) = self.registry.kill(target) {
                        self.grid.remove_agent(target, &position);
                        self.metrics.increment_counter("gunshot_deaths");
                    }
                }
            }
            resolved.push(shot);
        }
        self.shots = resolved;
    }

    /// First cell along the trajectory containing a hit decides the impact;
    /// within that cell the nearest entry point to the shooter wins.
    fn find_shot_impact(&self, shot: &ShotRecord) -> Option<(AgentId, Point)> {
        let seg = shot.segment;
        for (row, col) in geometry::cells_crossed(&seg, self.grid.cell_width, self.grid.cell_height)
        {
            if row < 0 || col < 0 {
                continue;
            }
            let (row, col) = (row as usize, col as usize);
            if row >= self.grid.rows || col >= self.grid.cols {
                continue;
            }

            let mut best: Option<(f64, AgentId, Point)> = None;
            for &id in self.grid.agents_in(row, col) {
                if id == shot.shooter {
                    continue;
                }
                let Some(record) = self.registry.get(id) else {
                    continue;
                };
                let body = Rect::from_center(
                    &record.position,
                    self.config.agents.agent_width,
                    self.config.agents.agent_height,
                );
                let Some(clipped) = geometry::clip_segment(&body, &seg) else {
                    continue;
                };
                let entry = clipped.a;
                let d = seg.a.distance_squared_to(&entry);
                if best.map_or(true, |(bd, _, _)| d < bd) {
                    best = Some((d, id, entry));
                }
            }
            if let Some((_, id, impact)) = best {
                return Some((id, impact));
            }
        }
        None
    }

    /// Current termination state.
    pub fn outcome(&self) -> Outcome {
        let counts = self.registry.counts();
        if counts.humans() == 0 {
            return Outcome::ZombiesPrevail;
        }
        if self.infection_seeded && counts.zombified == 0 && counts.infected == 0 {
            return Outcome::HumansPrevail;
        }
        Outcome::Ongoing
    }

    /// Immutable per-phase view for collaborators.
    pub fn snapshot(&self) -> PhaseSnapshot {
        PhaseSnapshot {
            phase: self.phase,
            alive: self.registry.iter().map(AgentSnapshot::from).collect(),
            dead: self.registry.dead().iter().map(AgentSnapshot::from).collect(),
            walls: self.walls.all(),
            shots: self.shots.clone(),
            resources: self.resources,
            counts: self.registry.counts(),
            outcome: self.outcome(),
        }
    }

    // Player commands. All best effort: they report what was actually done
    // and never fail loudly.

    pub fn buy_vaccine_kits(&mut self, requested: u32) -> u32 {
        self.resources
            .buy_vaccine_kits(self.config.resources.vaccine_kit_cost, requested)
    }

    pub fn buy_weapon_kits(&mut self, requested: u32) -> u32 {
        self.resources
            .buy_weapon_kits(self.config.resources.weapon_kit_cost, requested)
    }

    pub fn buy_wall_length(&mut self, requested: u32) -> u32 {
        self.resources
            .buy_wall_length(self.config.resources.wall_unit_cost, requested)
    }

    /// Consumes one vaccination kit on up to the configured recipients cap.
    pub fn use_vaccine_kit(&mut self) -> bool {
        economy::use_vaccine_kit(
            &mut self.resources,
            &mut self.registry,
            self.config.resources.vaccinations_per_kit,
        )
    }

    /// Consumes one weapon kit on up to the configured recipients cap.
    pub fn use_weapon_kit(&mut self) -> bool {
        economy::use_weapon_kit(
            &mut self.resources,
            &mut self.registry,
            self.config.resources.weapons_per_kit,
            self.config.combat.bullets_per_weapon_kit,
        )
    }

    /// Builds a player wall, debiting available wall length. Partial builds
    /// shorten the wall from its start point.
    pub fn build_wall(&mut self, segment: Segment, destructible: bool) -> Option<WallId> {
        let mut available = self.resources.wall_length;
        let id = self.walls.build_wall(
            segment,
            destructible,
            self.config.resources.wall_build_padding,
            &mut available,
            &mut self.grid,
        );
        self.resources.wall_length = available;
        id
    }

    pub fn phase(&self) -> u64 {
        self.phase
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn registry(&self) -> &PopulationRegistry {
        &self.registry
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn walls(&self) -> &WallStore {
        &self.walls
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// All walls as plain values, in id order.
    pub fn wall_list(&self) -> Vec<Wall> {
        self.walls.all()
    }

    /// Shots recorded for the current phase.
    pub fn shots(&self) -> &[ShotRecord] {
        &self.shots
    }

    /// Recomputes one agent's perception against the current state. Test
    /// support for occlusion scenarios.
    pub fn perceive_agent(&self, id: AgentId) -> Option<Perception> {
        let record = self.registry.get(id)?;
        Some(perception::perceive(
            record,
            &self.registry,
            &self.grid,
            &self.walls.all(),
            &self.config.agents,
        ))
    }
}
