// src/redraw.rs

//! Host primitive for marking views dirty after a reload.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

/// Ask the host to redraw every view.
///
/// Takes `&self`; implementations that record state use interior
/// mutability.
pub trait RedrawNotifier {
    fn request_redraw(&self);
}

/// Redraw notifier for hosts without views: logs each request and counts
/// them.
#[derive(Debug, Default)]
pub struct TracingRedraw {
    requests: AtomicU64,
}

impl TracingRedraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

impl RedrawNotifier for TracingRedraw {
    fn request_redraw(&self) {
        let n = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        info!(request = n, "redraw requested for all views");
    }
}
