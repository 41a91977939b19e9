//! Immutable per-phase view of the simulation exposed to collaborators.

use crate::economy::Resources;
use crate::environment::Outcome;
use crate::population::PopulationCounts;
use necrosim_data::{AgentId, AgentRecord, LifeStatus, ShotRecord, Species, Wall};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub x: f64,
    pub y: f64,
    pub species: Species,
    pub life: LifeStatus,
    pub infected: bool,
    pub vaccinated: bool,
    pub bullets: u32,
    pub wounds: u32,
}

impl From<&AgentRecord> for AgentSnapshot {
    fn from(record: &AgentRecord) -> Self {
        let human = record.kind.as_human();
        Self {
            id: record.id,
            x: record.position.x,
            y: record.position.y,
            species: record.species(),
            life: record.life,
            infected: record.is_infected_human(),
            vaccinated: human.is_some_and(|h| h.vaccinated),
            bullets: human.map_or(0, |h| h.bullets),
            wounds: record.wounds,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PhaseSnapshot {
    pub phase: u64,
    pub alive: Vec<AgentSnapshot>,
    pub dead: Vec<AgentSnapshot>,
    pub walls: Vec<Wall>,
    pub shots: Vec<ShotRecord>,
    pub resources: Resources,
    pub counts: PopulationCounts,
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use necrosim_data::{AgentKind, HumanState, Point};

    #[test]
    fn test_agent_snapshot_from_record() {
        let mut state = HumanState::healthy();
        state.bullets = 3;
        state.vaccinated = true;
        let record = AgentRecord::new(AgentId(9), Point::new(1.5, 2.5), AgentKind::Human(state));

        let snap = AgentSnapshot::from(&record);
        assert_eq!(snap.id, AgentId(9));
        assert_eq!(snap.species, Species::Human);
        assert!(!snap.infected);
        assert!(snap.vaccinated);
        assert_eq!(snap.bullets, 3);
        assert!((snap.x - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_zombie_snapshot_has_no_human_fields() {
        let record = AgentRecord::new(AgentId(1), Point::new(0.0, 0.0), AgentKind::Zombie);
        let snap = AgentSnapshot::from(&record);
        assert_eq!(snap.species, Species::Zombie);
        assert!(!snap.vaccinated);
        assert_eq!(snap.bullets, 0);
    }
}
