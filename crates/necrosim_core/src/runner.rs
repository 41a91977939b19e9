//! Cooperative background run loop.
//!
//! Executes phases back-to-back on a dedicated worker thread with a minimum
//! inter-phase delay. The loop polls a stop flag between phases, never
//! mid-phase, and exits on its own once the simulation reaches a final
//! outcome.

use crate::environment::{Outcome, SimulationEnvironment};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub struct SimulationRunner {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl SimulationRunner {
    /// Spawns the run loop over a shared environment. Collaborators keep
    /// their own handle to the environment for snapshots and player
    /// commands between phases.
    pub fn spawn(env: Arc<Mutex<SimulationEnvironment>>, min_delay: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = std::thread::spawn(move || {
            loop {
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
                let started = Instant::now();
                let outcome = {
                    let mut env = env.lock().unwrap_or_else(|e| e.into_inner());
                    env.step_phase();
                    env.outcome()
                };
                if outcome != Outcome::Ongoing {
                    tracing::info!(?outcome, "Simulation reached final state");
                    break;
                }
                let elapsed = started.elapsed();
                if elapsed < min_delay {
                    std::thread::sleep(min_delay - elapsed);
                }
            }
        });

        Self {
            handle: Some(handle),
            stop,
        }
    }

    /// Requests a cooperative stop and waits for the current phase to
    /// finish.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
