use necrosim_core::config::{PopulationConfig, SimulationConfig};
use necrosim_core::environment::{Outcome, SimulationEnvironment};

fn config(healthy: usize, infected: usize, zombified: usize) -> SimulationConfig {
    SimulationConfig {
        population: PopulationConfig {
            initially_healthy: healthy,
            initially_infected: infected,
            initially_zombified: zombified,
            initial_bullets: 0,
        },
        seed: Some(11),
        ..Default::default()
    }
}

#[test]
fn test_zombies_prevail_when_no_humans_remain() {
    let env = SimulationEnvironment::new(config(0, 0, 4)).unwrap();
    assert_eq!(env.outcome(), Outcome::ZombiesPrevail);
}

#[test]
fn test_humans_prevail_once_seeded_infection_is_purged() {
    // A certain-win human side clears the only zombie as soon as they meet.
    let mut cfg = config(8, 0, 1);
    cfg.combat.zombie_win_unarmed = 0.0;
    cfg.combat.human_kill_vs_escape = 1.0;
    // Smell spanning the arena and a speed edge guarantee the encounter.
    cfg.agents.zombie_smell = 300.0;
    cfg.agents.human_speed = 0.5;
    let mut env = SimulationEnvironment::new(cfg).unwrap();

    let mut outcome = env.outcome();
    assert_eq!(outcome, Outcome::Ongoing);
    for _ in 0..2000 {
        env.step_phase();
        outcome = env.outcome();
        if outcome != Outcome::Ongoing {
            break;
        }
    }
    assert_eq!(outcome, Outcome::HumansPrevail);
}

#[test]
fn test_never_final_without_seeded_infection() {
    let mut env = SimulationEnvironment::new(config(6, 0, 0)).unwrap();
    for _ in 0..50 {
        env.step_phase();
        assert_eq!(env.outcome(), Outcome::Ongoing);
    }
}

#[test]
fn test_infected_humans_block_humans_prevail() {
    // No zombies, but a latent infection is still pending.
    let mut cfg = config(5, 1, 0);
    cfg.combat.latency_phases = 100;
    let env = SimulationEnvironment::new(cfg).unwrap();
    assert_eq!(env.outcome(), Outcome::Ongoing);
}
