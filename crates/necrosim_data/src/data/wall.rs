use super::agent::AgentId;
use super::geometry::Segment;
use serde::{Deserialize, Serialize};

/// Stable identity of a wall. A wall split by a breach retires its id; each
/// remainder piece receives a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WallId(pub u64);

/// A wall segment in the arena. Permanent walls (arena border,
/// inaccessible-cell borders, reinforced player builds) cannot be breached;
/// destructible walls can be pushed down by massed zombies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub segment: Segment,
    pub destructible: bool,
}

/// A shot fired this phase. The segment initially spans the whole clipped
/// trajectory and is shortened to the impact point during shot resolution;
/// records are discarded at the start of the following phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub shooter: AgentId,
    pub segment: Segment,
}
