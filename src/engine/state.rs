// src/engine/state.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::clock::Timestamp;

/// The host-managed "enabled" property.
///
/// Clones share one flag, so the host UI can hold a copy and clear it
/// directly; the controller notices on its next tick. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct EnabledFlag(Arc<AtomicBool>);

impl EnabledFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }
}

/// Mutable state owned by one `WatchController`.
///
/// `timer` is `Some` exactly while the controller is enabled; `last_poll`
/// is set by `start()` before the first tick can scan.
#[derive(Debug)]
pub struct WatchState<H> {
    pub(crate) enabled: EnabledFlag,
    pub(crate) last_poll: Option<Timestamp>,
    pub(crate) timer: Option<H>,
}

impl<H> WatchState<H> {
    pub fn new(enabled: EnabledFlag) -> Self {
        Self {
            enabled,
            last_poll: None,
            timer: None,
        }
    }
}
