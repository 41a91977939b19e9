//! Player resource economy: money, vaccination kits, weapon kits and wall
//! length.
//!
//! All operations are best effort: purchases clamp to what money affords and
//! report the units actually bought, kit uses report whether a kit was
//! consumed. Nothing here fails loudly. All four counters stay
//! non-negative.

use crate::config::ResourceConfig;
use crate::population::PopulationRegistry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub money: u32,
    pub vaccine_kits: u32,
    pub weapon_kits: u32,
    pub wall_length: f64,
}

impl Resources {
    pub fn new(config: &ResourceConfig) -> Self {
        Self {
            money: config.initial_money,
            vaccine_kits: 0,
            weapon_kits: 0,
            wall_length: config.initial_wall_length,
        }
    }

    /// Units affordable at `unit_cost`, clamped to `requested`. A unit cost
    /// of zero means unlimited.
    fn affordable(&self, unit_cost: u32, requested: u32) -> u32 {
        if unit_cost == 0 {
            requested
        } else {
            (self.money / unit_cost).min(requested)
        }
    }

    /// Buys up to `requested` vaccination kits; returns the units bought.
    pub fn buy_vaccine_kits(&mut self, unit_cost: u32, requested: u32) -> u32 {
        let units = self.affordable(unit_cost, requested);
        self.money -= units * unit_cost;
        self.vaccine_kits += units;
        units
    }

    /// Buys up to `requested` weapon kits; returns the units bought.
    pub fn buy_weapon_kits(&mut self, unit_cost: u32, requested: u32) -> u32 {
        let units = self.affordable(unit_cost, requested);
        self.money -= units * unit_cost;
        self.weapon_kits += units;
        units
    }

    /// Buys up to `requested` units of wall length; returns the units
    /// bought.
    pub fn buy_wall_length(&mut self, unit_cost: u32, requested: u32) -> u32 {
        let units = self.affordable(unit_cost, requested);
        self.money -= units * unit_cost;
        self.wall_length += f64::from(units);
        units
    }
}

/// Consumes one vaccination kit and vaccinates up to `cap` healthy,
/// unvaccinated humans in ascending id order. Returns whether a kit was
/// used.
pub fn use_vaccine_kit(
    resources: &mut Resources,
    registry: &mut PopulationRegistry,
    cap: usize,
) -> bool {
    if resources.vaccine_kits == 0 {
        return false;
    }
    resources.vaccine_kits -= 1;

    let mut remaining = cap;
    for id in registry.ids() {
        if remaining == 0 {
            break;
        }
        let Some(record) = registry.get_mut(id) else {
            continue;
        };
        let Some(human) = record.kind.as_human_mut() else {
            continue;
        };
        if human.vaccinated || human.is_infected() {
            continue;
        }
        human.vaccinated = true;
        remaining -= 1;
    }
    true
}

/// Consumes one weapon kit and arms up to `cap` unarmed humans with
/// `bullets_per_kit` bullets each, in ascending id order. Returns whether a
/// kit was used.
pub fn use_weapon_kit(
    resources: &mut Resources,
    registry: &mut PopulationRegistry,
    cap: usize,
    bullets_per_kit: u32,
) -> bool {
    if resources.weapon_kits == 0 {
        return false;
    }
    resources.weapon_kits -= 1;

    let mut remaining = cap;
    for id in registry.ids() {
        if remaining == 0 {
            break;
        }
        let Some(record) = registry.get_mut(id) else {
            continue;
        };
        let Some(human) = record.kind.as_human_mut() else {
            continue;
        };
        if human.is_armed() {
            continue;
        }
        human.bullets = bullets_per_kit;
        remaining -= 1;
    }
    true
}
