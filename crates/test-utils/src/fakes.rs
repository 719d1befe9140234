//! In-memory registry and redraw fakes for driving the scanner and runtime.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use autoreload::errors::ReloadFailed;
use autoreload::redraw::RedrawNotifier;
use autoreload::registry::{ResourceRegistry, TrackedResource};
use autoreload::types::ResourceKind;

/// Ids passed to `reload()`, in call order. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct ReloadLog(Arc<Mutex<Vec<String>>>);

impl ReloadLog {
    pub fn ids(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, id: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|i| *i == id).count()
    }

    pub fn total(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    fn push(&self, id: &str) {
        self.0.lock().unwrap().push(id.to_string());
    }
}

#[derive(Debug)]
pub struct FakeResource {
    id: String,
    path: PathBuf,
    kind: ResourceKind,
    fail: bool,
    log: ReloadLog,
}

impl TrackedResource for FakeResource {
    fn id(&self) -> &str {
        &self.id
    }

    fn file_path(&self) -> &Path {
        &self.path
    }

    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn reload(&mut self) -> Result<(), ReloadFailed> {
        // Attempts are logged even when they fail.
        self.log.push(&self.id);
        if self.fail {
            return Err(ReloadFailed::Read {
                path: self.path.clone(),
                reason: "fake failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Registry of [`FakeResource`]s sharing one [`ReloadLog`].
#[derive(Debug)]
pub struct FakeRegistry {
    root: PathBuf,
    items: Vec<FakeResource>,
    log: ReloadLog,
}

impl FakeRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            items: Vec::new(),
            log: ReloadLog::default(),
        }
    }

    pub fn with(mut self, id: &str, path: &str, kind: ResourceKind) -> Self {
        self.push(id, path, kind, false);
        self
    }

    pub fn with_failing(mut self, id: &str, path: &str) -> Self {
        self.push(id, path, ResourceKind::Image, true);
        self
    }

    pub fn log(&self) -> ReloadLog {
        self.log.clone()
    }

    fn push(&mut self, id: &str, path: &str, kind: ResourceKind, fail: bool) {
        self.items.push(FakeResource {
            id: id.to_string(),
            path: PathBuf::from(path),
            kind,
            fail,
            log: self.log.clone(),
        });
    }
}

impl ResourceRegistry for FakeRegistry {
    fn root(&self) -> &Path {
        &self.root
    }

    fn resources_mut(&mut self) -> Box<dyn Iterator<Item = &mut dyn TrackedResource> + '_> {
        Box::new(self.items.iter_mut().map(|r| r as &mut dyn TrackedResource))
    }
}

/// Counts redraw requests. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct RecordingRedraw(Arc<AtomicUsize>);

impl RecordingRedraw {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl RedrawNotifier for RecordingRedraw {
    fn request_redraw(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
