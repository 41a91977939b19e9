//! Bounded, occlusion-filtered perception snapshots.
//!
//! A perception is computed against the pre-phase state and expressed
//! relative to the perceiving agent (agent at origin). Visibility requires
//! both range and a clear line of sight: any wall segment crossing the
//! straight line between two agents hides them from each other. Zombie
//! smell uses the olfactory radius only and ignores occlusion.
//!
//! The grid scan is bounded to cells within `ceil(radius / cell_size)`
//! rows/columns of the perceiver's home cell. That is an index acceleration
//! detail: the result set is identical to an exhaustive scan.

use crate::config::AgentConfig;
use crate::geometry;
use crate::grid::SpatialGrid;
use crate::population::PopulationRegistry;
use necrosim_data::{AgentRecord, Point, Rect, Segment, Species, Wall};

/// What a human sees: walls clipped to its vision window, plus other
/// humans and zombies within vision and line of sight.
#[derive(Debug, Clone, Default)]
pub struct HumanPerception {
    pub walls: Vec<Segment>,
    pub humans: Vec<Point>,
    pub zombies: Vec<Point>,
}

/// What a zombie sees and smells. Seen categories are occlusion-gated;
/// smelled categories only require the olfactory radius.
#[derive(Debug, Clone, Default)]
pub struct ZombiePerception {
    pub walls: Vec<Segment>,
    pub healthy: Vec<Point>,
    pub infected: Vec<Point>,
    pub zombies: Vec<Point>,
    pub smelled_healthy: Vec<Point>,
    pub smelled_infected: Vec<Point>,
    pub smelled_zombies: Vec<Point>,
}

impl ZombiePerception {
    pub fn sees_humans(&self) -> bool {
        !self.healthy.is_empty() || !self.infected.is_empty()
    }

    pub fn smells_humans(&self) -> bool {
        !self.smelled_healthy.is_empty() || !self.smelled_infected.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum Perception {
    Human(HumanPerception),
    Zombie(ZombiePerception),
}

/// True when no wall crosses the straight segment between two positions.
pub fn sight_clear(from: &Point, to: &Point, walls: &[Wall]) -> bool {
    let sight = Segment::new(*from, *to);
    !walls
        .iter()
        .any(|w| geometry::segments_intersect(&sight, &w.segment))
}

/// Wall segments clipped to the square vision window of side `2 * vision`
/// centered on `origin`, expressed relative to `origin`.
fn nearby_walls(origin: &Point, vision: f64, walls: &[Wall]) -> Vec<Segment> {
    let window = Rect::from_center(origin, 2.0 * vision, 2.0 * vision);
    walls
        .iter()
        .filter_map(|w| geometry::clip_segment(&window, &w.segment))
        .map(|s| s.relative_to(origin))
        .collect()
}

/// Computes the perception snapshot for one agent against the current
/// registry, grid and wall list.
pub fn perceive(
    record: &AgentRecord,
    registry: &PopulationRegistry,
    grid: &SpatialGrid,
    walls: &[Wall],
    agents: &AgentConfig,
) -> Perception {
    match record.species() {
        Species::Human => Perception::Human(perceive_human(record, registry, grid, walls, agents)),
        Species::Zombie => {
            Perception::Zombie(perceive_zombie(record, registry, grid, walls, agents))
        }
    }
}

fn perceive_human(
    record: &AgentRecord,
    registry: &PopulationRegistry,
    grid: &SpatialGrid,
    walls: &[Wall],
    agents: &AgentConfig,
) -> HumanPerception {
    let origin = record.position;
    let vision = agents.vision_for(Species::Human);
    let vision_sq = vision * vision;
    let mut out = HumanPerception {
        walls: nearby_walls(&origin, vision, walls),
        ..Default::default()
    };

    for (row, col) in grid.cells_within(&origin, vision) {
        for &other_id in grid.agents_in(row, col) {
            if other_id == record.id {
                continue;
            }
            let Some(other) = registry.get(other_id) else {
                continue;
            };
            if origin.distance_squared_to(&other.position) > vision_sq
                || !sight_clear(&origin, &other.position, walls)
            {
                continue;
            }
            let relative = Point::new(other.position.x - origin.x, other.position.y - origin.y);
            match other.species() {
                Species::Human => out.humans.push(relative),
                Species::Zombie => out.zombies.push(relative),
            }
        }
    }
    out
}

fn perceive_zombie(
    record: &AgentRecord,
    registry: &PopulationRegistry,
    grid: &SpatialGrid,
    walls: &[Wall],
    agents: &AgentConfig,
) -> ZombiePerception {
    let origin = record.position;
    let vision = agents.vision_for(Species::Zombie);
    let smell = agents.zombie_smell;
    let vision_sq = vision * vision;
    let smell_sq = smell * smell;
    let mut out = ZombiePerception {
        walls: nearby_walls(&origin, vision, walls),
        ..Default::default()
    };

    for (row, col) in grid.cells_within(&origin, vision.max(smell)) {
        for &other_id in grid.agents_in(row, col) {
            if other_id == record.id {
                continue;
            }
            let Some(other) = registry.get(other_id) else {
                continue;
            };
            let dist_sq = origin.distance_squared_to(&other.position);
            let relative = Point::new(other.position.x - origin.x, other.position.y - origin.y);

            let smelled = dist_sq <= smell_sq;
            let seen = dist_sq <= vision_sq && sight_clear(&origin, &other.position, walls);
            if !smelled && !seen {
                continue;
            }

            match (other.species(), other.is_infected_human()) {
                (Species::Human, false) => {
                    if seen {
                        out.healthy.push(relative);
                    }
                    if smelled {
                        out.smelled_healthy.push(relative);
                    }
                }
                (Species::Human, true) => {
                    if seen {
                        out.infected.push(relative);
                    }
                    if smelled {
                        out.smelled_infected.push(relative);
                    }
                }
                (Species::Zombie, _) => {
                    if seen {
                        out.zombies.push(relative);
                    }
                    if smelled {
                        out.smelled_zombies.push(relative);
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::population::healthy_human;
    use crate::walls::WallStore;
    use necrosim_data::AgentKind;

    struct Fixture {
        registry: PopulationRegistry,
        grid: SpatialGrid,
        store: WallStore,
        config: AgentConfig,
    }

    fn fixture() -> Fixture {
        Fixture {
            registry: PopulationRegistry::new(),
            grid: SpatialGrid::new(&GridConfig::default()),
            store: WallStore::new(),
            config: AgentConfig::default(),
        }
    }

    #[test]
    fn test_agent_within_range_is_visible() {
        let mut f = fixture();
        let a = f.registry.spawn(Point::new(50.0, 50.0), healthy_human(0));
        f.registry.spawn(Point::new(60.0, 50.0), AgentKind::Zombie);
        for record in f.registry.iter().cloned().collect::<Vec<_>>() {
            f.grid.insert_agent(record.id, &record.position);
        }

        let record = f.registry.get(a).unwrap().clone();
        let Perception::Human(p) =
            perceive(&record, &f.registry, &f.grid, &f.store.all(), &f.config)
        else {
            panic!("human perceiver")
        };
        assert_eq!(p.zombies, vec![Point::new(10.0, 0.0)]);
        assert!(p.humans.is_empty());
    }

    #[test]
    fn test_agent_beyond_vision_is_hidden() {
        let mut f = fixture();
        let a = f.registry.spawn(Point::new(50.0, 50.0), healthy_human(0));
        f.registry.spawn(Point::new(90.0, 50.0), AgentKind::Zombie);
        for record in f.registry.iter().cloned().collect::<Vec<_>>() {
            f.grid.insert_agent(record.id, &record.position);
        }

        let record = f.registry.get(a).unwrap().clone();
        let Perception::Human(p) =
            perceive(&record, &f.registry, &f.grid, &f.store.all(), &f.config)
        else {
            panic!("human perceiver")
        };
        assert!(p.zombies.is_empty());
    }

    #[test]
    fn test_wall_between_agents_occludes() {
        let mut f = fixture();
        let a = f.registry.spawn(Point::new(50.0, 50.0), healthy_human(0));
        f.registry.spawn(Point::new(60.0, 50.0), AgentKind::Zombie);
        for record in f.registry.iter().cloned().collect::<Vec<_>>() {
            f.grid.insert_agent(record.id, &record.position);
        }
        let wall_id = f
            .store
            .add_wall(
                Segment::new(Point::new(55.0, 40.0), Point::new(55.0, 60.0)),
                true,
                &mut f.grid,
            )
            .unwrap();

        let record = f.registry.get(a).unwrap().clone();
        let Perception::Human(p) =
            perceive(&record, &f.registry, &f.grid, &f.store.all(), &f.config)
        else {
            panic!("human perceiver")
        };
        assert!(p.zombies.is_empty(), "wall must occlude the zombie");

        // Same positions, wall removed: visible again.
        f.store.remove_wall(wall_id, &mut f.grid);
        let Perception::Human(p) =
            perceive(&record, &f.registry, &f.grid, &f.store.all(), &f.config)
        else {
            panic!("human perceiver")
        };
        assert_eq!(p.zombies.len(), 1);
    }

    #[test]
    fn test_zombie_smell_ignores_occlusion() {
        let mut f = fixture();
        let z = f.registry.spawn(Point::new(50.0, 50.0), AgentKind::Zombie);
        f.registry.spawn(Point::new(60.0, 50.0), healthy_human(0));
        for record in f.registry.iter().cloned().collect::<Vec<_>>() {
            f.grid.insert_agent(record.id, &record.position);
        }
        let _ = f.store.add_wall(
            Segment::new(Point::new(55.0, 40.0), Point::new(55.0, 60.0)),
            true,
            &mut f.grid,
        );

        let record = f.registry.get(z).unwrap().clone();
        let Perception::Zombie(p) =
            perceive(&record, &f.registry, &f.grid, &f.store.all(), &f.config)
        else {
            panic!("zombie perceiver")
        };
        assert!(p.healthy.is_empty(), "sight is blocked");
        assert_eq!(p.smelled_healthy.len(), 1, "smell is not");
    }

    #[test]
    fn test_walls_are_clipped_to_vision_window() {
        let mut f = fixture();
        let a = f.registry.spawn(Point::new(100.0, 100.0), healthy_human(0));
        f.grid.insert_agent(a, &Point::new(100.0, 100.0));
        // Spans far beyond the 30-unit vision window.
        let _ = f.store.add_wall(
            Segment::new(Point::new(0.0, 110.0), Point::new(200.0, 110.0)),
            true,
            &mut f.grid,
        );

        let record = f.registry.get(a).unwrap().clone();
        let Perception::Human(p) =
            perceive(&record, &f.registry, &f.grid, &f.store.all(), &f.config)
        else {
            panic!("human perceiver")
        };
        assert_eq!(p.walls.len(), 1);
        let w = p.walls[0];
        assert!((w.a.x - -30.0).abs() < 1e-9);
        assert!((w.b.x - 30.0).abs() < 1e-9);
        assert!((w.a.y - 10.0).abs() < 1e-9);
    }
}
