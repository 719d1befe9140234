// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::errors::Result;
use crate::redraw::RedrawNotifier;
use crate::registry::ResourceRegistry;

use super::controller::WatchController;
use super::timer::Timer;
use super::{ControlEvent, TickOutcome};

/// Drives a [`WatchController`] in response to [`ControlEvent`]s.
///
/// This is the IO shell: it owns the event channel, the registry and the
/// redraw hook, and hands them to the controller one event at a time. All
/// state transitions happen inside the controller.
pub struct Runtime<T: Timer, C: Clock> {
    controller: WatchController<T, C>,
    event_rx: mpsc::Receiver<ControlEvent>,
    registry: Box<dyn ResourceRegistry + Send>,
    redraw: Box<dyn RedrawNotifier + Send>,
}

impl<T: Timer, C: Clock> fmt::Debug for Runtime<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl<T: Timer, C: Clock> Runtime<T, C> {
    pub fn new(
        controller: WatchController<T, C>,
        event_rx: mpsc::Receiver<ControlEvent>,
        registry: Box<dyn ResourceRegistry + Send>,
        redraw: Box<dyn RedrawNotifier + Send>,
    ) -> Self {
        Self {
            controller,
            event_rx,
            registry,
            redraw,
        }
    }

    pub fn controller(&self) -> &WatchController<T, C> {
        &self.controller
    }

    /// Main event loop.
    ///
    /// Runs until a `Shutdown` event arrives. The loop also ends if the
    /// channel closes, which cannot happen while a `TokioTimer` holds a
    /// sender. The timer is always released before returning.
    pub async fn run(mut self) -> Result<()> {
        info!("autoreload runtime started");

        while let Some(event) = self.event_rx.recv().await {
            if !matches!(event, ControlEvent::Tick) {
                debug!(?event, "runtime received event");
            }

            if !self.handle(event) {
                info!("shutdown requested; stopping runtime");
                break;
            }
        }

        self.controller.stop();
        info!("runtime exiting");
        Ok(())
    }

    /// Apply one event. Returns false when the loop should exit.
    fn handle(&mut self, event: ControlEvent) -> bool {
        match event {
            ControlEvent::Toggle => {
                let status = self.controller.toggle();
                info!(%status, label = status.toggle_label(), "toggled");
            }
            ControlEvent::Start => {
                self.controller.start();
            }
            ControlEvent::Stop => {
                self.controller.stop();
            }
            ControlEvent::Tick => {
                let outcome = self
                    .controller
                    .on_tick(self.registry.as_mut(), self.redraw.as_ref());
                if let TickOutcome::Scanned { reloaded: true } = outcome {
                    debug!("tick reloaded at least one image");
                }
            }
            ControlEvent::Query(reply) => {
                // The asker may have gone away; that is not our problem.
                let _ = reply.send(self.controller.status());
            }
            ControlEvent::Shutdown => return false,
        }
        true
    }
}
