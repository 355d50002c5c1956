//! Real-time driver for one farm session.
//!
//! The engine sits behind a single mutex shared by the ticking task and every
//! action dispatch, so an action never interleaves with a tick. One task owns
//! the time-unit interval; the engine's own counter decides which cadences are
//! due on each unit.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{error, info};

use crate::{
    actions::{Action, ActionError, ActionReceipt},
    config::SimulationConfig,
    engine::{Engine, EngineError},
    snapshot::FarmSnapshot,
};

const FRAME_CHANNEL_CAPACITY: usize = 256;

struct Driver {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct Session {
    engine: Arc<Mutex<Engine>>,
    frames: broadcast::Sender<FarmSnapshot>,
    time_unit: Duration,
    driver: Option<Driver>,
}

impl Session {
    pub fn new(engine: Engine, time_unit: Duration) -> Self {
        let (frames, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            frames,
            time_unit,
            driver: None,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self, EngineError> {
        let engine = Engine::from_config(config)?;
        Ok(Self::new(
            engine,
            Duration::from_millis(config.cadence.time_unit_ms),
        ))
    }

    /// False once the driver has exited, whether through `stop` or because a
    /// tick failed and stopped the engine.
    pub fn is_running(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|driver| !driver.handle.is_finished())
    }

    /// Starts ticking. Must be called from within a tokio runtime. Returns
    /// false if the session was already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        // A driver that exited on its own has nothing left to join.
        self.driver = None;
        lock(&self.engine).start();

        let engine = Arc::clone(&self.engine);
        let frames = self.frames.clone();
        let period = self.time_unit;
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        let frame = {
                            let mut engine = lock(&engine);
                            match engine.advance() {
                                Ok(_) => engine.snapshot(),
                                Err(EngineError::Inactive) => break,
                                Err(err) => {
                                    error!(error = %err, "tick failed, stopping session");
                                    engine.stop();
                                    break;
                                }
                            }
                        };
                        // No subscribers is fine.
                        let _ = frames.send(frame);
                    }
                }
            }
        });

        self.driver = Some(Driver { shutdown, handle });
        self.publish();
        true
    }

    /// Stops ticking. Once this returns no handler will touch the farm again
    /// until the next `start`. Returns false if the session was not running.
    pub async fn stop(&mut self) -> bool {
        let Some(driver) = self.driver.take() else {
            return false;
        };
        // Flipping the flag under the lock means any tick that wins the race
        // for the mutex after this point sees an inactive engine.
        lock(&self.engine).stop();
        let _ = driver.shutdown.send(true);
        if let Err(err) = driver.handle.await {
            if !err.is_cancelled() {
                error!(error = %err, "session driver task panicked");
            }
        }
        info!("session driver stopped");
        self.publish();
        true
    }

    pub fn dispatch(&self, action: Action) -> Result<ActionReceipt, ActionError> {
        let (result, frame) = {
            let mut engine = lock(&self.engine);
            let result = engine.dispatch(action);
            (result, engine.snapshot())
        };
        if result.is_ok() {
            let _ = self.frames.send(frame);
        }
        result
    }

    pub fn snapshot(&self) -> FarmSnapshot {
        lock(&self.engine).snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FarmSnapshot> {
        self.frames.subscribe()
    }

    fn publish(&self) {
        let _ = self.frames.send(self.snapshot());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            lock(&self.engine).stop();
            driver.handle.abort();
        }
    }
}

fn lock(engine: &Mutex<Engine>) -> MutexGuard<'_, Engine> {
    // A panicking tick leaves the farm clamped and consistent, so keep going.
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}
