// src/engine/timer.rs

//! Recurring timer primitive.
//!
//! - [`TokioTimer`] is used in production: each schedule spawns a task that
//!   posts [`ControlEvent::Tick`] into the runtime channel.
//! - [`ManualTimer`] never fires; it only records allocations so tests can
//!   assert on them and deliver ticks by hand.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::engine::ControlEvent;

/// Longest period a [`TokioTimer`] will wait between ticks.
pub const MAX_TIMER_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Allocates and releases recurring timers.
pub trait Timer {
    /// Identifies one live timer. Handed back to [`Timer::cancel`].
    type Handle;

    fn schedule(&mut self, interval: Duration) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

/// Timer backed by a tokio task. Must be used inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTimer {
    tx: mpsc::Sender<ControlEvent>,
}

impl TokioTimer {
    pub fn new(tx: mpsc::Sender<ControlEvent>) -> Self {
        Self { tx }
    }
}

/// Owns the ticking task; aborts it on drop.
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Timer for TokioTimer {
    type Handle = TimerHandle;

    fn schedule(&mut self, interval: Duration) -> TimerHandle {
        // tokio rejects a zero period.
        let interval = interval.clamp(Duration::from_millis(1), MAX_TIMER_PERIOD);
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            let now = Instant::now();
            let first = now.checked_add(interval).unwrap_or(now);
            let mut ticker = time::interval_at(first, interval);
            // A slow loop must not cause a burst of catch-up ticks.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                match tx.try_send(ControlEvent::Tick) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => trace!("event loop busy; dropping tick"),
                    Err(TrySendError::Closed(_)) => break,
                }
            }
            debug!("timer task finished");
        });

        debug!(?interval, "timer scheduled");
        TimerHandle { task }
    }

    fn cancel(&mut self, handle: TimerHandle) {
        drop(handle);
        debug!("timer cancelled");
    }
}

/// Handle returned by [`ManualTimer`].
#[derive(Debug, PartialEq, Eq)]
pub struct ManualTimerHandle(u64);

#[derive(Debug, Default)]
struct ManualTimerLog {
    next_id: u64,
    active: Vec<u64>,
    scheduled: usize,
    cancelled: usize,
    last_interval: Option<Duration>,
}

/// Timer that never fires. Clones share the same allocation log.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    log: Arc<Mutex<ManualTimerLog>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of timers ever allocated.
    pub fn scheduled(&self) -> usize {
        self.log.lock().unwrap().scheduled
    }

    /// Total number of timers released.
    pub fn cancelled(&self) -> usize {
        self.log.lock().unwrap().cancelled
    }

    /// Timers currently alive.
    pub fn active(&self) -> usize {
        self.log.lock().unwrap().active.len()
    }

    pub fn last_interval(&self) -> Option<Duration> {
        self.log.lock().unwrap().last_interval
    }
}

impl Timer for ManualTimer {
    type Handle = ManualTimerHandle;

    fn schedule(&mut self, interval: Duration) -> ManualTimerHandle {
        let mut log = self.log.lock().unwrap();
        let id = log.next_id;
        log.next_id += 1;
        log.active.push(id);
        log.scheduled += 1;
        log.last_interval = Some(interval);
        ManualTimerHandle(id)
    }

    fn cancel(&mut self, handle: ManualTimerHandle) {
        let mut log = self.log.lock().unwrap();
        log.active.retain(|id| *id != handle.0);
        log.cancelled += 1;
    }
}
