// src/fs/mock.rs

use super::FileSystem;
use crate::clock::Timestamp;
use crate::errors::ResourceUnavailable;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        content: Vec<u8>,
        modified: Timestamp,
        denied: bool,
    },
    Dir(Vec<String>), // List of child names
}

/// In-memory filesystem with explicit modification times.
///
/// Clones share the same entries, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    /// Add a file whose mtime is the UNIX epoch.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.add_file_at(path, content, Timestamp::from_secs_f64(0.0));
    }

    pub fn add_file_at(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        modified: Timestamp,
    ) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        files.insert(
            path.clone(),
            MockEntry::File {
                content: content.into(),
                modified,
                denied: false,
            },
        );

        // Ensure parent directories exist implicitly for simplicity in this mock
        if let Some(parent) = path.parent() {
            let parent = normalize_parent(parent);
            Self::ensure_dir_entry(&mut files, parent);
            Self::link_child(&mut files, parent, &path);
        }
    }

    /// Change only the mtime of an existing file.
    pub fn set_modified(&self, path: impl AsRef<Path>, to: Timestamp) {
        let mut files = self.files.lock().unwrap();
        if let Some(MockEntry::File { modified, .. }) = files.get_mut(path.as_ref()) {
            *modified = to;
        }
    }

    /// Make every query on `path` fail with permission denied.
    pub fn deny(&self, path: impl AsRef<Path>) {
        let mut files = self.files.lock().unwrap();
        if let Some(MockEntry::File { denied, .. }) = files.get_mut(path.as_ref()) {
            *denied = true;
        }
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.files.lock().unwrap();
        files.remove(path);

        if let Some(parent) = path.parent() {
            let parent = normalize_parent(parent);
            if let (Some(MockEntry::Dir(children)), Some(name)) =
                (files.get_mut(parent), path.file_name().and_then(|n| n.to_str()))
            {
                children.retain(|c| c != name);
            }
        }
    }

    fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if let Some(parent) = path.parent() {
            let parent = normalize_parent(parent);
            if parent != path {
                // Avoid infinite loop at root
                Self::ensure_dir_entry(files, parent);
                Self::link_child(files, parent, path);
            }
        }
    }

    fn link_child(files: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

fn normalize_parent(parent: &Path) -> &Path {
    if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File { denied: true, .. }) => {
                Err(anyhow!("Permission denied: {:?}", path))
            }
            Some(MockEntry::File { content, .. }) => Ok(content.clone()),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn modified(&self, path: &Path) -> std::result::Result<Timestamp, ResourceUnavailable> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File { denied: true, .. }) => {
                Err(ResourceUnavailable::PermissionDenied(path.to_path_buf()))
            }
            Some(MockEntry::File { modified, .. }) => Ok(*modified),
            // Directories carry no mtime in the mock.
            Some(MockEntry::Dir(_)) => Err(ResourceUnavailable::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("is a directory"),
            }),
            None => Err(ResourceUnavailable::NotFound(path.to_path_buf())),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::Dir(_)))
    }

    // The mock has no links.
    fn is_symlink(&self, _path: &Path) -> bool {
        false
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // In mock, we just return the path as is, assuming absolute paths are used in tests
        Ok(path.to_path_buf())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_files_are_listed_under_their_parents() {
        let fs = MockFileSystem::new();
        fs.add_file("/assets/tex/a.png", b"a".to_vec());

        assert!(fs.is_dir(Path::new("/assets")));
        assert_eq!(
            fs.read_dir(Path::new("/assets/tex")).unwrap(),
            vec![PathBuf::from("/assets/tex/a.png")]
        );
    }

    #[test]
    fn removed_files_report_not_found() {
        let fs = MockFileSystem::new();
        fs.add_file("/a.png", b"a".to_vec());
        fs.remove("/a.png");

        assert!(matches!(
            fs.modified(Path::new("/a.png")),
            Err(ResourceUnavailable::NotFound(_))
        ));
        assert!(fs.read_dir(Path::new("/")).unwrap().is_empty());
    }

    #[test]
    fn denied_files_fail_both_queries() {
        let fs = MockFileSystem::new();
        fs.add_file("/a.png", b"a".to_vec());
        fs.deny("/a.png");

        assert!(matches!(
            fs.modified(Path::new("/a.png")),
            Err(ResourceUnavailable::PermissionDenied(_))
        ));
        assert!(fs.read(Path::new("/a.png")).is_err());
    }

    #[test]
    fn set_modified_changes_mtime_only() {
        let fs = MockFileSystem::new();
        fs.add_file("/a.png", b"a".to_vec());
        fs.set_modified("/a.png", Timestamp::from_secs_f64(42.0));

        assert_eq!(
            fs.modified(Path::new("/a.png")).unwrap(),
            Timestamp::from_secs_f64(42.0)
        );
        assert_eq!(fs.read(Path::new("/a.png")).unwrap(), b"a".to_vec());
    }
}
