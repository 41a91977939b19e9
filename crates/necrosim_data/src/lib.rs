//! Shared data types for the necrosim workspace.
//!
//! This crate holds the plain value types exchanged between the simulation
//! engine and its collaborators: geometric primitives, agent records, walls
//! and shot records. It contains no simulation logic; behavior lives in
//! `necrosim_core`.

pub mod data;

pub use data::agent::{
    AgentId, AgentKind, AgentRecord, HealthStatus, HumanState, LifeStatus, Species,
};
pub use data::geometry::{Point, Rect, Segment, Vec2};
pub use data::wall::{ShotRecord, Wall, WallId};
