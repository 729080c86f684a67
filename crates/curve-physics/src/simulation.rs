//! Fixed-cadence background simulation thread.

use crossbeam_channel::{Sender, select};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::engine::PhysicsEngine;

/// Ticks between timing reports.
const REPORT_EVERY: u64 = 100;

/// Steps a [`PhysicsEngine`] on its own thread at a fixed interval.
///
/// Each step advances the world by the wall time elapsed since the previous
/// tick, so a late tick catches up rather than slowing the simulation.
/// The thread stops when the loop is dropped.
pub struct SimulationLoop {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl SimulationLoop {
    /// Spawn the simulation thread.
    pub fn start(engine: PhysicsEngine, interval: Duration) -> std::io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);

        let handle = std::thread::Builder::new()
            .name("curve-physics".into())
            .spawn(move || {
                let ticker = crossbeam_channel::tick(interval);
                let mut last = Instant::now();
                let mut spent = Duration::ZERO;
                info!(?interval, "simulation loop started");

                loop {
                    select! {
                        recv(shutdown_rx) -> _ => break,
                        recv(ticker) -> tick => {
                            let Ok(now) = tick else { break };
                            let dt = now.saturating_duration_since(last);
                            last = now;

                            let started = Instant::now();
                            engine.step(dt.as_secs_f64());
                            spent += started.elapsed();

                            let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
                            if n % REPORT_EVERY == 0 {
                                debug!(
                                    ticks = n,
                                    time_per_tick = ?(spent / REPORT_EVERY as u32),
                                    bodies = engine.body_count(),
                                    "simulation timing"
                                );
                                spent = Duration::ZERO;
                            }
                        }
                    }
                }
                info!("simulation loop stopped");
            })?;

        Ok(Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
            ticks,
        })
    }

    /// Steps taken so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Stop the thread and wait for it to exit.
    pub fn stop(&mut self) {
        // Dropping the sender disconnects the channel, which also wakes the loop.
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SimulationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
