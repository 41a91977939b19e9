use super::geometry::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Stable identity of an agent. Identities are allocated monotonically and
/// never reused; all mutable state lives in the [`AgentRecord`] looked up by
/// this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

/// Perception/decision behavior class of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Species {
    Human,
    Zombie,
}

/// Life status is terminal: `Alive` transitions to `Dead`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeStatus {
    Alive,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Infected,
}

/// Human-only mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HumanState {
    pub health: HealthStatus,
    /// Phases remaining before an infected human turns. Unused while healthy.
    pub latency_remaining: u32,
    pub bullets: u32,
    pub vaccinated: bool,
}

impl HumanState {
    pub fn healthy() -> Self {
        Self {
            health: HealthStatus::Healthy,
            latency_remaining: 0,
            bullets: 0,
            vaccinated: false,
        }
    }

    pub fn infected(latency: u32) -> Self {
        Self {
            health: HealthStatus::Infected,
            latency_remaining: latency,
            bullets: 0,
            vaccinated: false,
        }
    }

    pub fn is_infected(&self) -> bool {
        self.health == HealthStatus::Infected
    }

    pub fn is_armed(&self) -> bool {
        self.bullets > 0
    }
}

/// Species-specific payload of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AgentKind {
    Human(HumanState),
    Zombie,
}

impl AgentKind {
    pub fn species(&self) -> Species {
        match self {
            AgentKind::Human(_) => Species::Human,
            AgentKind::Zombie => Species::Zombie,
        }
    }

    pub fn as_human(&self) -> Option<&HumanState> {
        match self {
            AgentKind::Human(h) => Some(h),
            AgentKind::Zombie => None,
        }
    }

    pub fn as_human_mut(&mut self) -> Option<&mut HumanState> {
        match self {
            AgentKind::Human(h) => Some(h),
            AgentKind::Zombie => None,
        }
    }
}

/// Full mutable state of one agent. Exactly one record exists per live
/// identity; the position is owned here and never aliased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub position: Point,
    /// Last applied movement direction (unit vector, or zero before the
    /// first move).
    pub heading: Vec2,
    pub life: LifeStatus,
    pub wounds: u32,
    pub kind: AgentKind,
}

impl AgentRecord {
    pub fn new(id: AgentId, position: Point, kind: AgentKind) -> Self {
        Self {
            id,
            position,
            heading: Vec2::ZERO,
            life: LifeStatus::Alive,
            wounds: 0,
            kind,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeStatus::Alive
    }

    pub fn species(&self) -> Species {
        self.kind.species()
    }

    pub fn is_zombie(&self) -> bool {
        self.species() == Species::Zombie
    }

    /// True for humans that are infected; zombies are never "infected".
    pub fn is_infected_human(&self) -> bool {
        self.kind.as_human().is_some_and(|h| h.is_infected())
    }
}
