mod common;

use common::{unarmed_human, EnvironmentBuilder};
use necrosim_core::VectorOps;
use necrosim_data::{AgentKind, Point, Vec2};

const TOL: f64 = 1e-9;

#[test]
fn test_lone_human_heads_directly_away_from_zombie() {
    // Zombie at vision - 1 along +x, arena borders far outside the vision
    // window: the flee heading is the exact opposite unit vector.
    let (mut env, ids) = EnvironmentBuilder::new()
        .with_agent(Point::new(100.0, 100.0), unarmed_human())
        .with_agent(Point::new(129.0, 100.0), AgentKind::Zombie)
        .build();

    env.step_phase();
    let human = env.registry().get(ids[0]).expect("human survives the phase");
    assert!((human.heading.x + 1.0).abs() < TOL);
    assert!(human.heading.y.abs() < TOL);
    // And it actually moved away at full speed.
    let speed = env.config().agents.human_speed;
    assert!((human.position.x - (100.0 - speed)).abs() < TOL);
}

#[test]
fn test_zombie_chases_visible_human() {
    let (mut env, ids) = EnvironmentBuilder::new()
        .with_agent(Point::new(100.0, 100.0), unarmed_human())
        .with_agent(Point::new(115.0, 100.0), AgentKind::Zombie)
        .build();

    env.step_phase();
    let zombie = env.registry().get(ids[1]).expect("zombie survives the phase");
    assert!((zombie.heading.x + 1.0).abs() < TOL, "chases along -x");
    assert!(zombie.position.x < 115.0);
}

#[test]
fn test_flee_heading_blends_two_zombies() {
    let (mut env, ids) = EnvironmentBuilder::new()
        .with_agent(Point::new(100.0, 100.0), unarmed_human())
        .with_agent(Point::new(110.0, 100.0), AgentKind::Zombie)
        .with_agent(Point::new(100.0, 110.0), AgentKind::Zombie)
        .build();

    env.step_phase();
    let human = env.registry().get(ids[0]).expect("human survives the phase");
    // Equidistant threats on +x and +y: escape along the -x/-y diagonal.
    let expected = Vec2::new(-1.0, -1.0).normalized();
    assert!((human.heading.x - expected.x).abs() < 1e-6);
    assert!((human.heading.y - expected.y).abs() < 1e-6);
}
