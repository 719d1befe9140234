// src/watch/scanner.rs

//! One pass over the registry: detect, reload, notify.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::clock::Timestamp;
use crate::redraw::RedrawNotifier;
use crate::registry::ResourceRegistry;
use crate::types::FirstScanPolicy;
use crate::watch::detect::ChangeDetector;

/// What a single scan did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Eligible (image) resources whose mtime was compared.
    pub examined: usize,
    /// Resources skipped because of their kind.
    pub skipped: usize,
    /// Ids reloaded successfully, in registry order.
    pub reloaded: Vec<String>,
    /// Ids that changed on disk but failed to reload.
    pub failed: Vec<String>,
}

impl ScanReport {
    pub fn did_reload(&self) -> bool {
        !self.reloaded.is_empty()
    }
}

/// Walks a registry once per call and reloads the images that changed.
#[derive(Debug, Clone)]
pub struct ReloadScanner {
    detector: ChangeDetector,
    first_scan: FirstScanPolicy,
}

impl ReloadScanner {
    pub fn new(detector: ChangeDetector, first_scan: FirstScanPolicy) -> Self {
        Self {
            detector,
            first_scan,
        }
    }

    pub fn first_scan(&self) -> FirstScanPolicy {
        self.first_scan
    }

    /// Returns true iff at least one resource was reloaded, in which case
    /// `redraw` was notified exactly once.
    pub fn scan(
        &self,
        registry: &mut dyn ResourceRegistry,
        redraw: &dyn RedrawNotifier,
        last_poll: Option<Timestamp>,
    ) -> bool {
        self.scan_report(registry, redraw, last_poll).did_reload()
    }

    pub fn scan_report(
        &self,
        registry: &mut dyn ResourceRegistry,
        redraw: &dyn RedrawNotifier,
        last_poll: Option<Timestamp>,
    ) -> ScanReport {
        let mut report = ScanReport::default();

        if last_poll.is_none() && self.first_scan == FirstScanPolicy::Seed {
            debug!("no previous poll boundary; seeding without reloading");
            return report;
        }

        let root: PathBuf = registry.root().to_path_buf();

        for resource in registry.resources_mut() {
            if !resource.kind().is_reloadable() {
                report.skipped += 1;
                continue;
            }
            report.examined += 1;

            if !self.detector.has_changed_since(&root, &*resource, last_poll) {
                continue;
            }

            let id = resource.id().to_string();
            match resource.reload() {
                Ok(()) => {
                    info!(%id, "reloaded");
                    report.reloaded.push(id);
                }
                Err(e) => {
                    warn!(%id, "reload failed: {e}");
                    report.failed.push(id);
                }
            }
        }

        if report.did_reload() {
            redraw.request_redraw();
        }

        debug!(
            examined = report.examined,
            skipped = report.skipped,
            reloaded = report.reloaded.len(),
            failed = report.failed.len(),
            "scan finished"
        );
        report
    }
}
