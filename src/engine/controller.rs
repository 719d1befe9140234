// src/engine/controller.rs

//! Pure watch state machine.
//!
//! `WatchController` owns the enabled flag, the timer handle and the last
//! poll boundary. It reacts to `start` / `stop` / `toggle` requests and to
//! timer ticks, and delegates the actual work of a tick to the
//! [`ReloadScanner`].
//!
//! It has no channels and performs no IO of its own beyond what the
//! scanner does, so it is unit tested with [`ManualTimer`] and
//! [`ManualClock`](crate::clock::ManualClock).
//!
//! [`ManualTimer`]: crate::engine::ManualTimer

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

use crate::clock::{Clock, Timestamp};
use crate::engine::state::{EnabledFlag, WatchState};
use crate::engine::timer::Timer;
use crate::engine::{StartOutcome, StopOutcome, TickOutcome, WatchStatus};
use crate::redraw::RedrawNotifier;
use crate::registry::ResourceRegistry;
use crate::watch::ReloadScanner;

/// Default timer interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct WatchController<T: Timer, C: Clock> {
    timer: T,
    clock: C,
    scanner: ReloadScanner,
    interval: Duration,
    state: WatchState<T::Handle>,
}

impl<T: Timer, C: Clock> fmt::Debug for WatchController<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchController")
            .field("status", &self.status())
            .field("interval", &self.interval)
            .field("last_poll", &self.state.last_poll)
            .finish_non_exhaustive()
    }
}

impl<T: Timer, C: Clock> WatchController<T, C> {
    /// Create a disabled controller. `enabled` is the host's UI flag; it is
    /// cleared here so every controller starts disabled.
    pub fn new(
        timer: T,
        clock: C,
        scanner: ReloadScanner,
        interval: Duration,
        enabled: EnabledFlag,
    ) -> Self {
        enabled.set(false);
        Self {
            timer,
            clock,
            scanner,
            interval,
            state: WatchState::new(enabled),
        }
    }

    pub fn status(&self) -> WatchStatus {
        if self.state.timer.is_some() {
            WatchStatus::Enabled
        } else {
            WatchStatus::Disabled
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status().is_enabled()
    }

    pub fn toggle_label(&self) -> &'static str {
        self.status().toggle_label()
    }

    pub fn last_poll(&self) -> Option<Timestamp> {
        self.state.last_poll
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// A handle to the shared enabled flag, for the host UI.
    pub fn enabled_flag(&self) -> EnabledFlag {
        self.state.enabled.clone()
    }

    pub fn start(&mut self) -> StartOutcome {
        if self.state.timer.is_some() {
            debug!("start requested while already enabled; ignoring");
            return StartOutcome::AlreadyRunning;
        }

        self.state.enabled.set(true);
        self.state.timer = Some(self.timer.schedule(self.interval));
        let now = self.clock.now();
        self.state.last_poll = Some(now);

        info!(interval = ?self.interval, last_poll = %now, "started");
        StartOutcome::Started
    }

    pub fn stop(&mut self) -> StopOutcome {
        if self.state.timer.is_none() {
            debug!("stop requested while already disabled; ignoring");
            return StopOutcome::AlreadyStopped;
        }

        self.release();
        info!("stopped");
        StopOutcome::Stopped
    }

    /// The single user-facing action. Returns the new status.
    pub fn toggle(&mut self) -> WatchStatus {
        if self.is_enabled() {
            self.stop();
        } else {
            self.start();
        }
        self.status()
    }

    /// Handle one timer firing.
    ///
    /// The boundary recorded for the next tick is the instant sampled
    /// before the scan, so a file written while the scan runs is still
    /// newer than it.
    pub fn on_tick(
        &mut self,
        registry: &mut dyn ResourceRegistry,
        redraw: &dyn RedrawNotifier,
    ) -> TickOutcome {
        if self.state.timer.is_none() {
            debug!("tick while disabled; ignoring");
            return TickOutcome::Ignored;
        }

        if !self.state.enabled.get() {
            self.release();
            info!("stopped: enabled flag was cleared");
            return TickOutcome::Cancelled;
        }

        let now = self.clock.now();
        let reloaded = self.scanner.scan(registry, redraw, self.state.last_poll);
        self.state.last_poll = Some(now);

        TickOutcome::Scanned { reloaded }
    }

    fn release(&mut self) {
        if let Some(handle) = self.state.timer.take() {
            self.timer.cancel(handle);
        }
        self.state.enabled.set(false);
        self.state.last_poll = None;
    }
}

impl<T: Timer, C: Clock> Drop for WatchController<T, C> {
    fn drop(&mut self) {
        if self.state.timer.is_some() {
            self.release();
            debug!("controller dropped; timer released");
        }
    }
}
