// src/registry/discover.rs

//! Build an [`ImageRegistry`] from the config file.
//!
//! Explicit `[image.<id>]` entries are registered first, in id order. Then
//! every file under `[images].root` that matches an `include` pattern and no
//! `exclude` pattern is registered, in path order, with its root-relative
//! path as id.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::fs::FileSystem;
use crate::registry::{ImageRegistry, ImageResource, ResourceRegistry};
use crate::types::ResourceKind;
use crate::watch::path_utils::{relative_str, resolve_path};

/// Compiled include/exclude glob patterns.
///
/// Patterns are matched against paths relative to the registry root, with
/// forward slashes (e.g. `"textures/wood.png"`).
#[derive(Clone)]
pub struct ImagePatterns {
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for ImagePatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePatterns")
            .field("include", &self.include.len())
            .field("exclude", &self.exclude.as_ref().map(GlobSet::len))
            .finish()
    }
}

impl ImagePatterns {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let include = build_globset(include).context("building include globset")?;
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };
        Ok(Self { include, exclude })
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect all files under `root` that match `patterns`, sorted by path.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    patterns: &ImagePatterns,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                // Linked directories can loop back into the tree.
                if fs.is_symlink(&path) {
                    debug!(?path, "skipping symlinked directory");
                    continue;
                }
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Some(rel) = relative_str(root, &path) {
                    if patterns.matches(&rel) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Build the registry described by `cfg`.
///
/// `base_dir` is the directory containing the config file; `[images].root`
/// is resolved against it. Images are registered but not loaded; call
/// [`ImageRegistry::load_all`] afterwards.
pub fn build_registry(
    cfg: &ConfigFile,
    base_dir: &Path,
    fs: Arc<dyn FileSystem>,
) -> Result<ImageRegistry> {
    let section = cfg.images_section();
    let root = match &section.root {
        Some(dir) => resolve_path(base_dir, Path::new(dir)),
        None => base_dir.to_path_buf(),
    };
    let root = fs.canonicalize(&root).unwrap_or(root);

    let mut registry = ImageRegistry::new(root.clone());

    for (id, entry) in cfg.images() {
        let path = resolve_path(&root, Path::new(&entry.path));
        registry.register(ImageResource::new(id.clone(), path, entry.kind, fs.clone()));
    }

    if !section.include.is_empty() {
        let patterns = ImagePatterns::new(&section.include, &section.exclude)?;
        let files = collect_matching_files(fs.as_ref(), &root, &patterns)
            .with_context(|| format!("discovering images under {:?}", root))?;

        for path in files {
            if registry.contains_path(&path) {
                continue;
            }
            let Some(id) = relative_str(&root, &path) else {
                continue;
            };
            debug!(%id, "discovered image");
            registry.register(ImageResource::new(id, path, ResourceKind::Image, fs.clone()));
        }
    }

    info!(root = ?registry.root(), count = registry.len(), "image registry built");
    Ok(registry)
}
