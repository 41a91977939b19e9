//! # Necrosim Core
//!
//! The simulation environment engine for necrosim - a phase-stepped outbreak
//! simulation of human and zombie agents on a continuous 2D arena overlaid by
//! a coarse grid.
//!
//! This crate contains the deterministic simulation logic, including:
//! - Spatial indexing of agents and destructible walls
//! - The occlusion-filtered perception pipeline
//! - Pure per-species decision logic (flee, chase, shoot, wander)
//! - Movement with wall collision and conflict resolution
//! - Infection progression, wall breach and ballistics
//! - The player-facing resource economy
//!
//! ## Architecture
//!
//! One discrete *phase* is the unit of atomicity: perceptions for every agent
//! are computed against the pre-phase state before any action is applied, so
//! no agent observes another agent's post-move position within the same
//! phase. All mutation happens serially in the apply/resolve steps; the
//! perception pass is read-only and may run in parallel.
//!
//! ## Example
//!
//! ```
//! use necrosim_core::config::SimulationConfig;
//! use necrosim_core::environment::SimulationEnvironment;
//!
//! let mut config = SimulationConfig::default();
//! config.seed = Some(42);
//! let mut env = SimulationEnvironment::new(config).unwrap();
//! env.step_phase();
//! let snapshot = env.snapshot();
//! assert_eq!(snapshot.phase, 1);
//! ```

/// Human and zombie decision logic
pub mod agent;
/// Configuration management for simulation parameters
pub mod config;
/// Resource economy (money, kits, wall length)
pub mod economy;
/// Simulation environment orchestrator
pub mod environment;
/// Line clipping, intersection and grid traversal primitives
pub mod geometry;
/// Grid of cells indexing agents and destructible walls
pub mod grid;
/// Performance metrics collection and logging
pub mod metrics;
/// Bounded, occlusion-filtered perception snapshots
pub mod perception;
/// Population registry with aggregate counters and dead history
pub mod population;
/// Cooperative background run loop
pub mod runner;
/// Read-only per-phase snapshots for collaborators
pub mod snapshot;
/// 2D vector operations
pub mod vector;
/// Wall store, construction and breach splitting
pub mod walls;

pub use agent::Action;
pub use environment::{Outcome, SimulationEnvironment};
pub use metrics::{init_logging, Metrics};
pub use necrosim_data::{AgentId, AgentKind, AgentRecord, Point, Rect, Segment, Vec2, Wall};
pub use runner::SimulationRunner;
pub use snapshot::PhaseSnapshot;
pub use vector::VectorOps;
