// src/engine/mod.rs

//! The toggleable polling engine.
//!
//! This module ties together:
//! - the enabled flag and the watch state
//! - the timer that produces ticks
//! - the main runtime event loop that reacts to:
//!   - toggle / start / stop requests from the host UI
//!   - timer ticks
//!   - status queries
//!   - shutdown signals
//!
//! The pure state machine lives in [`controller`]; the async/IO shell is
//! implemented in [`runtime`].

use std::fmt;

use tokio::sync::oneshot;

/// Externally visible watcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    Disabled,
    Enabled,
}

impl WatchStatus {
    pub fn is_enabled(self) -> bool {
        self == WatchStatus::Enabled
    }

    /// Label for the single toggle action: what pressing it would do.
    pub fn toggle_label(self) -> &'static str {
        match self {
            WatchStatus::Disabled => "Enable",
            WatchStatus::Enabled => "Disable",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchStatus::Disabled => f.write_str("disabled"),
            WatchStatus::Enabled => f.write_str("enabled"),
        }
    }
}

/// Result of [`WatchController::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Already enabled; nothing changed.
    AlreadyRunning,
}

/// Result of [`WatchController::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    /// Already disabled; nothing changed.
    AlreadyStopped,
}

/// Result of [`WatchController::on_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick arrived while disabled (e.g. queued before `stop()`).
    Ignored,
    /// The enabled flag had been cleared externally; the timer was released
    /// and no scan ran.
    Cancelled,
    /// A scan ran.
    Scanned { reloaded: bool },
}

/// Events flowing into the runtime from the host UI and the timer.
#[derive(Debug)]
pub enum ControlEvent {
    /// The single user-facing action: stop if enabled, else start.
    Toggle,
    Start,
    Stop,
    /// The recurring timer fired.
    Tick,
    /// Reply with the current status.
    Query(oneshot::Sender<WatchStatus>),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    Shutdown,
}

pub mod controller;
pub mod runtime;
pub mod state;
pub mod timer;

pub use controller::WatchController;
pub use runtime::Runtime;
pub use state::{EnabledFlag, WatchState};
pub use timer::{ManualTimer, ManualTimerHandle, Timer, TimerHandle, TokioTimer};
