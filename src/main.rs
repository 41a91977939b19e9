use anyhow::{Context, Result};
use clap::Parser;
use necrosim_core::config::SimulationConfig;
use necrosim_core::environment::{Outcome, SimulationEnvironment};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless human/zombie outbreak simulation", long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Maximum number of phases to run; 0 runs until a final outcome
    #[arg(short, long, default_value_t = 1000)]
    phases: u64,

    /// RNG seed override
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the final phase snapshot as JSON to this path
    #[arg(long)]
    dump_snapshot: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "necrosim=info,necrosim_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path}"))?;
            SimulationConfig::from_toml(&content)?
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let mut env = SimulationEnvironment::new(config)?;
    let mut phase = 0u64;
    let outcome = loop {
        env.step_phase();
        phase += 1;
        let outcome = env.outcome();
        if outcome != Outcome::Ongoing {
            break outcome;
        }
        if args.phases > 0 && phase >= args.phases {
            break outcome;
        }
    };

    let snapshot = env.snapshot();
    tracing::info!(
        phase,
        healthy = snapshot.counts.healthy,
        infected = snapshot.counts.infected,
        zombified = snapshot.counts.zombified,
        elapsed_ms = env.metrics().elapsed().as_millis() as u64,
        ?outcome,
        "Run finished"
    );
    println!(
        "phase {phase}: {} healthy, {} infected, {} zombified ({outcome:?})",
        snapshot.counts.healthy, snapshot.counts.infected, snapshot.counts.zombified
    );

    if let Some(path) = &args.dump_snapshot {
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {path}"))?;
        tracing::info!(path = %path, "Snapshot written");
    }
    Ok(())
}
