//! Runtime module - the shared engine handle and its timed loop
//!
//! The engine is driven by two actors: the tick thread owned by `GameLoop`
//! and synchronous input calls from the host. Both go through one mutex, so
//! every public mutating operation on the engine is serialized.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::core::GameEngine;

/// The engine as shared between the loop thread and the host.
pub type SharedEngine = Arc<Mutex<GameEngine>>;

/// Lock the shared engine, recovering from poisoning.
///
/// A panic mid-update can at worst leave a garbled board; there is no
/// invariant worth taking the whole process down for.
pub fn lock_engine(engine: &SharedEngine) -> MutexGuard<'_, GameEngine> {
    engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Dedicated tick thread: sleep for the current interval, skip gameplay
/// while paused or game-over, honor the one-shot extra delay, then run one
/// `update` under the lock.
pub struct GameLoop {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GameLoop {
    pub fn spawn(engine: SharedEngine) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                let tick = lock_engine(&engine).tick_interval();
                thread::sleep(tick);
                if flag.load(Ordering::Relaxed) {
                    break;
                }

                let extra = {
                    let mut guard = lock_engine(&engine);
                    if !guard.is_gameplay_active() {
                        continue;
                    }
                    guard.take_extra_delay()
                };
                thread::sleep(extra);

                lock_engine(&engine).update();
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signal the loop and wait for the thread to wind down.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        // Signal only; the thread may be mid-sleep and joining here could
        // stall teardown for a full tick.
        self.stop.store(true, Ordering::Relaxed);
    }
}
