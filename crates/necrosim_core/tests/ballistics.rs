mod common;

use common::{armed_human, unarmed_human, EnvironmentBuilder};
use necrosim_data::{AgentKind, Point};

const TOL: f64 = 1e-6;

fn pinned() -> EnvironmentBuilder {
    EnvironmentBuilder::new().with_config(|c| {
        c.agents.human_speed = 0.0;
        c.agents.zombie_speed = 0.0;
        c.agents.zombie_resting_speed = 0.0;
        c.combat.bullet_deviation = 0.0;
        c.combat.wound_kill_threshold = 2;
    })
}

#[test]
fn test_shot_is_clipped_to_first_impact() {
    let (mut env, ids) = pinned()
        .with_agent(Point::new(15.0, 15.0), armed_human(5))
        .with_agent(Point::new(35.0, 15.0), AgentKind::Zombie)
        .build();

    env.step_phase();

    let shots = env.shots();
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].shooter, ids[0]);
    // Impact at the near edge of the zombie's 1x1 body rectangle.
    assert!((shots[0].segment.b.x - 34.5).abs() < TOL);
    assert!((shots[0].segment.b.y - 15.0).abs() < TOL);

    let zombie = env.registry().get(ids[1]).expect("first wound is not lethal");
    assert_eq!(zombie.wounds, 1);
    let human = env.registry().get(ids[0]).unwrap();
    assert_eq!(human.kind.as_human().unwrap().bullets, 4);
}

#[test]
fn test_second_wound_kills_the_target() {
    let (mut env, ids) = pinned()
        .with_agent(Point::new(15.0, 15.0), armed_human(5))
        .with_agent(Point::new(35.0, 15.0), AgentKind::Zombie)
        .build();

    env.step_phase();
    env.step_phase();

    assert!(env.registry().get(ids[1]).is_none());
    assert_eq!(env.registry().counts().zombified, 0);
    assert_eq!(env.registry().dead().len(), 1);
}

#[test]
fn test_nearer_body_takes_the_hit() {
    // Two zombies on the same ray: only the nearer one is wounded.
    let (mut env, ids) = pinned()
        .with_agent(Point::new(15.0, 15.0), armed_human(5))
        .with_agent(Point::new(27.0, 15.0), AgentKind::Zombie)
        .with_agent(Point::new(35.0, 15.0), AgentKind::Zombie)
        .build();

    env.step_phase();

    let near = env.registry().get(ids[1]).unwrap();
    let far = env.registry().get(ids[2]).unwrap();
    assert_eq!(near.wounds, 1);
    assert_eq!(far.wounds, 0);
}

#[test]
fn test_bystander_blocks_the_shot() {
    // A human on the line of fire and a far zombie: hold fire, no shot.
    let (mut env, _) = pinned()
        .with_agent(Point::new(15.0, 15.0), armed_human(5))
        .with_agent(Point::new(25.0, 15.0), unarmed_human())
        .with_agent(Point::new(45.0, 15.0), AgentKind::Zombie)
        .build();

    env.step_phase();
    assert!(env.shots().is_empty());
}

#[test]
fn test_shot_segments_stay_inside_the_arena() {
    use necrosim_core::config::{PopulationConfig, SimulationConfig};
    use necrosim_core::environment::SimulationEnvironment;
    use necrosim_data::Rect;

    let config = SimulationConfig {
        population: PopulationConfig {
            initially_healthy: 20,
            initially_infected: 0,
            initially_zombified: 10,
            initial_bullets: 5,
        },
        seed: Some(21),
        ..Default::default()
    };
    let mut env = SimulationEnvironment::new(config).unwrap();
    let arena = Rect::new(Point::new(0.0, 0.0), Point::new(200.0, 200.0));

    let mut seen_any = false;
    for _ in 0..40 {
        env.step_phase();
        for shot in env.shots() {
            seen_any = true;
            assert!(arena.contains(&shot.segment.a));
            assert!(arena.contains(&shot.segment.b));
        }
    }
    assert!(seen_any, "armed humans among zombies must fire eventually");
}
