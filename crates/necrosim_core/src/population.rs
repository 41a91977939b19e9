//! Population registry: agent records, aggregate counters, dead history.
//!
//! Every state transition that affects the healthy/infected/zombified
//! aggregates goes through one of the transition methods here, so the
//! counters can never drift from the records. Iteration is in ascending id
//! order, which keeps phase processing deterministic.

use crate::config::CombatConfig;
use necrosim_data::{
    AgentId, AgentKind, AgentRecord, HealthStatus, HumanState, LifeStatus, Point,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub healthy: usize,
    pub infected: usize,
    pub zombified: usize,
}

impl PopulationCounts {
    pub fn humans(&self) -> usize {
        self.healthy + self.infected
    }
}

#[derive(Debug, Clone, Default)]
pub struct PopulationRegistry {
    records: BTreeMap<AgentId, AgentRecord>,
    dead: Vec<AgentRecord>,
    counts: PopulationCounts,
    next_id: u64,
}

impl PopulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Registers a new live agent and returns its identity.
    pub fn spawn(&mut self, position: Point, kind: AgentKind) -> AgentId {
        let id = self.allocate_id();
        match &kind {
            AgentKind::Human(h) => {
                if h.is_infected() {
                    self.counts.infected += 1;
                } else {
                    self.counts.healthy += 1;
                }
            }
            AgentKind::Zombie => self.counts.zombified += 1,
        }
        self.records.insert(id, AgentRecord::new(id, position, kind));
        id
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentRecord> {
        self.records.get_mut(&id)
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.records.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn counts(&self) -> PopulationCounts {
        self.counts
    }

    pub fn dead(&self) -> &[AgentRecord] {
        &self.dead
    }

    /// Marks an agent dead and moves it to the dead history. Life status is
    /// terminal; the caller removes the id from the grid in the same step.
    pub fn kill(&mut self, id: AgentId) -> Option<Point> {
        let mut record = self.records.remove(&id)?;
        match &record.kind {
            AgentKind::Human(h) => {
                if h.is_infected() {
                    self.counts.infected -= 1;
                } else {
                    self.counts.healthy -= 1;
                }
            }
            AgentKind::Zombie => self.counts.zombified -= 1,
        }
        record.life = LifeStatus::Dead;
        let position = record.position;
        self.dead.push(record);
        Some(position)
    }

    /// Infects a healthy human. Vaccination grants full immunity to
    /// infection (not to death), so vaccinated humans are unaffected.
    pub fn infect(&mut self, id: AgentId, latency: u32) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        let Some(human) = record.kind.as_human_mut() else {
            return;
        };
        if human.vaccinated || human.is_infected() {
            return;
        }
        human.health = HealthStatus::Infected;
        human.latency_remaining = latency;
        self.counts.healthy -= 1;
        self.counts.infected += 1;
    }

    /// Retires an infected human identity and creates a fresh zombie
    /// identity carrying over position and wound count. Returns the new id;
    /// the caller reindexes the grid cell in the same step.
    pub fn zombify(&mut self, id: AgentId) -> Option<AgentId> {
        let record = self.records.get(&id)?;
        if !record.is_infected_human() {
            return None;
        }
        let mut retired = self.records.remove(&id)?;
        retired.life = LifeStatus::Dead;
        self.counts.infected -= 1;

        let new_id = self.allocate_id();
        let mut zombie = AgentRecord::new(new_id, retired.position, AgentKind::Zombie);
        zombie.wounds = retired.wounds;
        zombie.heading = retired.heading;
        self.counts.zombified += 1;
        self.records.insert(new_id, zombie);
        self.dead.push(retired);
        Some(new_id)
    }

    /// Ids of infected humans whose latency expires this phase, after
    /// decrementing every latency counter.
    pub fn tick_latencies(&mut self) -> Vec<AgentId> {
        let mut expired = Vec::new();
        for (id, record) in self.records.iter_mut() {
            if let Some(human) = record.kind.as_human_mut() {
                if human.is_infected() {
                    human.latency_remaining = human.latency_remaining.saturating_sub(1);
                    if human.latency_remaining == 0 {
                        expired.push(*id);
                    }
                }
            }
        }
        expired
    }

    /// Applies one gunshot wound; returns true when the wound count reaches
    /// the kill threshold.
    pub fn wound(&mut self, id: AgentId, combat: &CombatConfig) -> bool {
        let Some(record) = self.records.get_mut(&id) else {
            return false;
        };
        record.wounds += 1;
        record.wounds >= combat.wound_kill_threshold
    }

    #[cfg(debug_assertions)]
    pub fn assert_counts_consistent(&self) {
        let mut recomputed = PopulationCounts::default();
        for record in self.records.values() {
            match &record.kind {
                AgentKind::Human(h) if h.is_infected() => recomputed.infected += 1,
                AgentKind::Human(_) => recomputed.healthy += 1,
                AgentKind::Zombie => recomputed.zombified += 1,
            }
        }
        debug_assert_eq!(recomputed, self.counts);
    }
}

/// Convenience constructors used by seeding and tests.
pub fn healthy_human(bullets: u32) -> AgentKind {
    let mut state = HumanState::healthy();
    state.bullets = bullets;
    AgentKind::Human(state)
}

pub fn infected_human(latency: u32) -> AgentKind {
    AgentKind::Human(HumanState::infected(latency))
}
