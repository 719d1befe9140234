// src/watch/detect.rs

//! Modification-time change detection for a single resource.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::clock::Timestamp;
use crate::errors::ResourceUnavailable;
use crate::fs::FileSystem;
use crate::registry::TrackedResource;
use crate::watch::path_utils::resolve_path;

/// Decides whether a resource's backing file changed since a poll boundary.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    fs: Arc<dyn FileSystem>,
}

impl ChangeDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Typed outcome of the comparison.
    ///
    /// Returns `Ok(true)` iff the file's mtime is strictly later than
    /// `since`. With no boundary (`None`) any readable mtime counts as a
    /// change.
    pub fn check(
        &self,
        root: &Path,
        resource: &dyn TrackedResource,
        since: Option<Timestamp>,
    ) -> Result<bool, ResourceUnavailable> {
        let path = resolve_path(root, resource.file_path());
        let modified = self.fs.modified(&path)?;

        let changed = match since {
            Some(boundary) => modified > boundary,
            None => true,
        };

        trace!(
            id = resource.id(),
            ?path,
            modified = %modified,
            since = ?since,
            changed,
            "compared mtime"
        );
        Ok(changed)
    }

    /// Like [`check`](Self::check), but an unavailable file is "unchanged".
    pub fn has_changed_since(
        &self,
        root: &Path,
        resource: &dyn TrackedResource,
        since: Option<Timestamp>,
    ) -> bool {
        match self.check(root, resource, since) {
            Ok(changed) => changed,
            Err(e) => {
                debug!(id = resource.id(), "treating resource as unchanged: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::errors::ReloadFailed;
    use crate::fs::mock::MockFileSystem;
    use crate::types::ResourceKind;

    struct Stub {
        path: PathBuf,
    }

    impl TrackedResource for Stub {
        fn id(&self) -> &str {
            "stub"
        }
        fn file_path(&self) -> &Path {
            &self.path
        }
        fn kind(&self) -> ResourceKind {
            ResourceKind::Image
        }
        fn reload(&mut self) -> Result<(), ReloadFailed> {
            Ok(())
        }
    }

    fn setup(mtime: f64) -> (ChangeDetector, MockFileSystem, Stub) {
        let fs = MockFileSystem::new();
        fs.add_file_at("/proj/a.png", b"a".to_vec(), Timestamp::from_secs_f64(mtime));
        let detector = ChangeDetector::new(Arc::new(fs.clone()));
        let stub = Stub {
            path: PathBuf::from("a.png"),
        };
        (detector, fs, stub)
    }

    #[test]
    fn newer_mtime_is_a_change() {
        let (detector, _fs, stub) = setup(105.0);
        let since = Timestamp::from_secs_f64(100.0);

        assert!(detector.has_changed_since(Path::new("/proj"), &stub, Some(since)));
    }

    #[test]
    fn equal_mtime_is_not_a_change() {
        let (detector, _fs, stub) = setup(100.0);
        let since = Timestamp::from_secs_f64(100.0);

        assert!(!detector.has_changed_since(Path::new("/proj"), &stub, Some(since)));
    }

    #[test]
    fn older_mtime_is_not_a_change() {
        let (detector, _fs, stub) = setup(99.0);
        let since = Timestamp::from_secs_f64(100.0);

        assert!(!detector.has_changed_since(Path::new("/proj"), &stub, Some(since)));
    }

    #[test]
    fn missing_boundary_counts_any_resolvable_file_as_changed() {
        let (detector, _fs, stub) = setup(1.0);

        assert!(detector.has_changed_since(Path::new("/proj"), &stub, None));
    }

    #[test]
    fn missing_file_is_unchanged_and_typed_as_not_found() {
        let (detector, fs, stub) = setup(200.0);
        fs.remove("/proj/a.png");
        let since = Timestamp::from_secs_f64(100.0);

        assert!(matches!(
            detector.check(Path::new("/proj"), &stub, Some(since)),
            Err(ResourceUnavailable::NotFound(_))
        ));
        assert!(!detector.has_changed_since(Path::new("/proj"), &stub, Some(since)));
        assert!(!detector.has_changed_since(Path::new("/proj"), &stub, None));
    }

    #[test]
    fn permission_denied_is_unchanged() {
        let (detector, fs, stub) = setup(200.0);
        fs.deny("/proj/a.png");

        assert!(!detector.has_changed_since(
            Path::new("/proj"),
            &stub,
            Some(Timestamp::from_secs_f64(100.0))
        ));
    }

    #[test]
    fn sub_second_changes_are_detected() {
        let (detector, fs, stub) = setup(100.0);
        let since = Timestamp::from_secs_f64(100.0);
        fs.set_modified("/proj/a.png", since + Duration::from_millis(1));

        assert!(detector.has_changed_since(Path::new("/proj"), &stub, Some(since)));
    }
}
