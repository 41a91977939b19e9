//! Pure decision logic mapping a perception snapshot to an action.
//!
//! Decisions are stateless per invocation: the only inputs are the agent's
//! own record, its perception (everything agent-relative, perceiver at the
//! origin) and the randomness source. Nothing here mutates the world; the
//! environment applies the returned action.

use crate::config::{AgentConfig, CombatConfig};
use crate::geometry;
use crate::perception::{HumanPerception, Perception, ZombiePerception};
use crate::vector::VectorOps;
use necrosim_data::{AgentRecord, Point, Rect, Segment, Species, Vec2};
use rand::Rng;
use std::f64::consts::{FRAC_PI_4, TAU};

/// One decided action. `Move` carries the velocity for this phase (its
/// magnitude is the species speed); `Shoot` carries the aim direction
/// relative to the shooter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Move(Vec2),
    Shoot(Vec2),
    Stay,
}

pub fn decide<R: Rng>(
    record: &AgentRecord,
    perception: &Perception,
    agents: &AgentConfig,
    combat: &CombatConfig,
    rng: &mut R,
) -> Action {
    match perception {
        Perception::Human(p) => decide_human(record, p, agents, combat, rng),
        Perception::Zombie(p) => decide_zombie(record, p, agents, rng),
    }
}

fn decide_human<R: Rng>(
    record: &AgentRecord,
    p: &HumanPerception,
    agents: &AgentConfig,
    combat: &CombatConfig,
    rng: &mut R,
) -> Action {
    let state = match record.kind.as_human() {
        Some(s) => *s,
        None => return Action::Stay,
    };

    if p.zombies.is_empty() {
        return wander(record.heading, agents.human_speed, &p.walls, agents, rng);
    }

    let Some(target) = geometry::nearest_point(&Point::ORIGIN, &p.zombies) else {
        return Action::Stay;
    };

    if state.is_armed() {
        let line_of_fire = Segment::new(Point::ORIGIN, target);
        let blocked = p.humans.iter().any(|h| {
            let body = Rect::from_center(h, agents.agent_width, agents.agent_height);
            geometry::segment_crosses_rect(&body, &line_of_fire)
        });
        if !blocked {
            return Action::Shoot(Vec2::new(target.x, target.y));
        }
        // A bystander blocks the shot. Hold position while the zombie is
        // still far, otherwise run.
        if Point::ORIGIN.distance_to(&target) > combat.safe_fire_distance {
            return Action::Stay;
        }
        return flee(record, p, agents);
    }

    flee(record, p, agents)
}

/// Flee behavior for an unarmed (or fire-blocked) human. Vaccinated humans
/// only avoid the single nearest zombie; unvaccinated humans blend every
/// visible zombie and wall into one weighted escape heading.
fn flee(record: &AgentRecord, p: &HumanPerception, agents: &AgentConfig) -> Action {
    let vaccinated = record.kind.as_human().is_some_and(|h| h.vaccinated);

    if vaccinated {
        let Some(nearest) = geometry::nearest_point(&Point::ORIGIN, &p.zombies) else {
            return keep_heading(record.heading, agents.human_speed);
        };
        let away = Vec2::new(-nearest.x, -nearest.y);
        if away.is_zero() {
            return keep_heading(record.heading, agents.human_speed);
        }
        let mut v = away.normalized();
        v.set_magnitude(agents.human_speed);
        return Action::Move(v);
    }

    let vision = agents.vision_for(Species::Human);
    let mut sum = Vec2::ZERO;

    for z in &p.zombies {
        let toward = Vec2::new(z.x, z.y);
        let dist = toward.magnitude();
        if dist < geometry::EPS {
            continue;
        }
        let weight = (vision + 1.0) - dist;
        if weight <= 0.0 {
            continue;
        }
        sum = sum + (-toward.normalized()) * weight;
    }
    for wall in &p.walls {
        let foot = geometry::nearest_point_on_line(&Point::ORIGIN, wall);
        // Outward normal points from the wall line back at the agent.
        let normal = Vec2::new(-foot.x, -foot.y);
        let dist = normal.magnitude();
        if dist < geometry::EPS {
            continue;
        }
        let weight = (vision + 1.0) - dist;
        if weight <= 0.0 {
            continue;
        }
        sum = sum + normal.normalized() * weight;
    }

    if sum.is_zero() {
        return keep_heading(record.heading, agents.human_speed);
    }
    let mut v = sum.normalized();
    v.set_magnitude(agents.human_speed);
    Action::Move(v)
}

fn decide_zombie<R: Rng>(
    record: &AgentRecord,
    p: &ZombiePerception,
    agents: &AgentConfig,
    rng: &mut R,
) -> Action {
    let seen: Vec<Point> = p.healthy.iter().chain(&p.infected).copied().collect();
    if let Some(target) = geometry::nearest_point(&Point::ORIGIN, &seen) {
        return chase(&target, agents.zombie_speed, record.heading);
    }

    let smelled: Vec<Point> = p
        .smelled_healthy
        .iter()
        .chain(&p.smelled_infected)
        .copied()
        .collect();
    if let Some(target) = geometry::nearest_point(&Point::ORIGIN, &smelled) {
        return chase(&target, agents.zombie_speed, record.heading);
    }

    wander(
        record.heading,
        agents.zombie_resting_speed,
        &p.walls,
        agents,
        rng,
    )
}

fn chase(target: &Point, speed: f64, prev_heading: Vec2) -> Action {
    let toward = Vec2::new(target.x, target.y);
    if toward.is_zero() {
        // Target exactly on top of us; an undefined heading helps nobody.
        return keep_heading(prev_heading, speed);
    }
    let mut v = toward.normalized();
    v.set_magnitude(speed);
    Action::Move(v)
}

fn keep_heading(prev: Vec2, speed: f64) -> Action {
    if prev.is_zero() {
        return Action::Stay;
    }
    let mut v = prev.normalized();
    v.set_magnitude(speed);
    Action::Move(v)
}

/// Bounded random wander: rotate the heading by a uniform angle within
/// 45 degrees either way, then bounce off the nearest wall the projected
/// step would cross within `speed + half-agent-diagonal`.
fn wander<R: Rng>(
    heading: Vec2,
    speed: f64,
    walls: &[Segment],
    agents: &AgentConfig,
    rng: &mut R,
) -> Action {
    let mut dir = if heading.is_zero() {
        let angle = rng.gen_range(0.0..TAU);
        Vec2::new(angle.cos(), angle.sin())
    } else {
        heading.normalized()
    };
    dir.rotate(rng.gen_range(-FRAC_PI_4..=FRAC_PI_4));

    let reach = speed + agents.half_diagonal();
    let probe = Segment::new(Point::ORIGIN, Point::new(dir.x * reach, dir.y * reach));
    let mut nearest: Option<(f64, Segment)> = None;
    for wall in walls {
        if let Some(hit) = geometry::segment_intersection(&probe, wall) {
            let d = Point::ORIGIN.distance_squared_to(&hit);
            if nearest.map_or(true, |(bd, _)| d < bd) {
                nearest = Some((d, *wall));
            }
        }
    }
    if let Some((_, wall)) = nearest {
        dir.reflect_across(&wall.direction());
    }

    dir.set_magnitude(speed);
    Action::Move(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::healthy_human;
    use necrosim_data::{AgentKind, HumanState};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const TOL: f64 = 1e-9;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn record(kind: AgentKind) -> AgentRecord {
        let mut r = AgentRecord::new(necrosim_data::AgentId(0), Point::new(50.0, 50.0), kind);
        r.heading = Vec2::new(1.0, 0.0);
        r
    }

    fn velocity(action: Action) -> Vec2 {
        match action {
            Action::Move(v) => v,
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn test_unarmed_human_flees_directly_away_from_lone_zombie() {
        let record = record(healthy_human(0));
        let p = HumanPerception {
            zombies: vec![Point::new(29.0, 0.0)],
            ..Default::default()
        };
        let agents = AgentConfig::default();
        let combat = CombatConfig::default();
        let v = velocity(decide(
            &record,
            &Perception::Human(p),
            &agents,
            &combat,
            &mut rng(),
        ));
        assert!((v.x + agents.human_speed).abs() < TOL);
        assert!(v.y.abs() < TOL);
    }

    #[test]
    fn test_weighted_flee_dominated_by_nearer_zombie() {
        let record = record(healthy_human(0));
        let p = HumanPerception {
            zombies: vec![Point::new(5.0, 0.0), Point::new(0.0, 25.0)],
            ..Default::default()
        };
        let v = velocity(decide(
            &record,
            &Perception::Human(p),
            &AgentConfig::default(),
            &CombatConfig::default(),
            &mut rng(),
        ));
        // Both components point away; the x component dominates.
        assert!(v.x < 0.0);
        assert!(v.y < 0.0);
        assert!(v.x.abs() > v.y.abs());
    }

    #[test]
    fn test_vaccinated_human_flees_only_nearest() {
        let mut state = HumanState::healthy();
        state.vaccinated = true;
        let record = record(AgentKind::Human(state));
        let p = HumanPerception {
            zombies: vec![Point::new(10.0, 0.0), Point::new(0.0, 12.0)],
            ..Default::default()
        };
        let agents = AgentConfig::default();
        let v = velocity(decide(
            &record,
            &Perception::Human(p),
            &agents,
            &CombatConfig::default(),
            &mut rng(),
        ));
        // Straight away from the nearest, the farther zombie ignored.
        assert!((v.x + agents.human_speed).abs() < TOL);
        assert!(v.y.abs() < TOL);
    }

    #[test]
    fn test_armed_human_shoots_nearest_zombie() {
        let record = record(healthy_human(3));
        let p = HumanPerception {
            zombies: vec![Point::new(20.0, 0.0), Point::new(8.0, 6.0)],
            ..Default::default()
        };
        let action = decide(
            &record,
            &Perception::Human(p),
            &AgentConfig::default(),
            &CombatConfig::default(),
            &mut rng(),
        );
        assert_eq!(action, Action::Shoot(Vec2::new(8.0, 6.0)));
    }

    #[test]
    fn test_blocked_shot_waits_when_zombie_is_far() {
        let record = record(healthy_human(3));
        let p = HumanPerception {
            zombies: vec![Point::new(20.0, 0.0)],
            humans: vec![Point::new(10.0, 0.0)],
            ..Default::default()
        };
        let action = decide(
            &record,
            &Perception::Human(p),
            &AgentConfig::default(),
            &CombatConfig::default(),
            &mut rng(),
        );
        assert_eq!(action, Action::Stay);
    }

    #[test]
    fn test_blocked_shot_flees_when_zombie_is_close() {
        let record = record(healthy_human(3));
        let p = HumanPerception {
            zombies: vec![Point::new(6.0, 0.0)],
            humans: vec![Point::new(3.0, 0.0)],
            ..Default::default()
        };
        let v = velocity(decide(
            &record,
            &Perception::Human(p),
            &AgentConfig::default(),
            &CombatConfig::default(),
            &mut rng(),
        ));
        assert!(v.x < 0.0);
    }

    #[test]
    fn test_zombie_prefers_sight_over_smell() {
        let record = record(AgentKind::Zombie);
        let p = ZombiePerception {
            healthy: vec![Point::new(15.0, 0.0)],
            smelled_healthy: vec![Point::new(15.0, 0.0), Point::new(-3.0, 0.0)],
            ..Default::default()
        };
        let agents = AgentConfig::default();
        let v = velocity(decide(
            &record,
            &Perception::Zombie(p),
            &agents,
            &CombatConfig::default(),
            &mut rng(),
        ));
        assert!((v.x - agents.zombie_speed).abs() < TOL);
        assert!(v.y.abs() < TOL);
    }

    #[test]
    fn test_zombie_tracks_smell_through_walls() {
        let record = record(AgentKind::Zombie);
        let p = ZombiePerception {
            smelled_infected: vec![Point::new(0.0, -9.0)],
            ..Default::default()
        };
        let agents = AgentConfig::default();
        let v = velocity(decide(
            &record,
            &Perception::Zombie(p),
            &agents,
            &CombatConfig::default(),
            &mut rng(),
        ));
        assert!(v.x.abs() < TOL);
        assert!((v.y + agents.zombie_speed).abs() < TOL);
    }

    #[test]
    fn test_zombie_wanders_at_resting_speed() {
        let record = record(AgentKind::Zombie);
        let p = ZombiePerception::default();
        let agents = AgentConfig::default();
        let v = velocity(decide(
            &record,
            &Perception::Zombie(p),
            &agents,
            &CombatConfig::default(),
            &mut rng(),
        ));
        assert!((v.magnitude() - agents.zombie_resting_speed).abs() < TOL);
    }

    #[test]
    fn test_wander_stays_within_quarter_turn() {
        let agents = AgentConfig::default();
        let mut r = rng();
        for _ in 0..200 {
            let heading = Vec2::new(1.0, 0.0);
            let v = velocity(wander(heading, 2.0, &[], &agents, &mut r));
            assert!(v.angle_between(&heading) <= FRAC_PI_4 + TOL);
        }
    }

    #[test]
    fn test_wander_bounces_off_blocking_wall() {
        let agents = AgentConfig::default();
        // A wall hugging the agent on every side within the probe reach
        // forces the bounce whatever the rotated heading is.
        let near_walls = [
            Segment::new(Point::new(-10.0, 0.2), Point::new(10.0, 0.2)),
            Segment::new(Point::new(-10.0, -0.2), Point::new(10.0, -0.2)),
            Segment::new(Point::new(0.2, -10.0), Point::new(0.2, 10.0)),
            Segment::new(Point::new(-0.2, -10.0), Point::new(-0.2, 10.0)),
        ];
        let mut r = rng();
        let v = velocity(wander(Vec2::new(1.0, 0.0), 2.0, &near_walls, &agents, &mut r));
        // Still a full-speed move; the bounce only redirects.
        assert!((v.magnitude() - 2.0).abs() < TOL);
    }

    #[test]
    fn test_chase_onto_own_position_keeps_heading() {
        let action = chase(&Point::ORIGIN, 2.0, Vec2::new(0.0, 1.0));
        assert_eq!(action, Action::Move(Vec2::new(0.0, 2.0)));
        assert_eq!(chase(&Point::ORIGIN, 2.0, Vec2::ZERO), Action::Stay);
    }
}
