// src/registry/images.rs

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageFormat, ImageReader};
use tracing::{debug, info, warn};

use crate::errors::ReloadFailed;
use crate::fs::FileSystem;
use crate::registry::{ResourceRegistry, TrackedResource};
use crate::types::ResourceKind;

/// What the host currently holds in memory for an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
    pub byte_len: usize,
    /// blake3 of the file bytes, hex encoded. Diagnostic only.
    pub digest: String,
}

/// An image backed by a file on disk.
pub struct ImageResource {
    id: String,
    path: PathBuf,
    kind: ResourceKind,
    fs: Arc<dyn FileSystem>,
    loaded: Option<LoadedImage>,
    generation: u64,
}

impl fmt::Debug for ImageResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResource")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl ImageResource {
    pub fn new(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        kind: ResourceKind,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            kind,
            fs,
            loaded: None,
            generation: 0,
        }
    }

    /// Data from the last successful load, if any.
    pub fn loaded(&self) -> Option<&LoadedImage> {
        self.loaded.as_ref()
    }

    /// Number of successful loads so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl TrackedResource for ImageResource {
    fn id(&self) -> &str {
        &self.id
    }

    fn file_path(&self) -> &Path {
        &self.path
    }

    fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// On failure the previously loaded data is kept.
    fn reload(&mut self) -> Result<(), ReloadFailed> {
        let bytes = self.fs.read(&self.path).map_err(|e| ReloadFailed::Read {
            path: self.path.clone(),
            reason: format!("{e:#}"),
        })?;

        let loaded = decode(&self.path, &bytes)?;
        debug!(
            id = %self.id,
            width = loaded.width,
            height = loaded.height,
            digest = %loaded.digest,
            "decoded image"
        );

        self.loaded = Some(loaded);
        self.generation += 1;
        Ok(())
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<LoadedImage, ReloadFailed> {
    let decode_err = |source: image::ImageError| ReloadFailed::Decode {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?;
    let format = reader.format();
    let (width, height) = reader.into_dimensions().map_err(decode_err)?;

    Ok(LoadedImage {
        width,
        height,
        format,
        byte_len: bytes.len(),
        digest: blake3::hash(bytes).to_hex().to_string(),
    })
}

/// Ordered collection of [`ImageResource`]s.
#[derive(Debug)]
pub struct ImageRegistry {
    root: PathBuf,
    images: Vec<ImageResource>,
}

impl ImageRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: Vec::new(),
        }
    }

    /// Append an image. Returns false (and drops it) if the id or the path
    /// is already registered.
    pub fn register(&mut self, image: ImageResource) -> bool {
        let duplicate = self
            .images
            .iter()
            .any(|existing| existing.id == image.id || existing.path == image.path);
        if duplicate {
            debug!(id = %image.id, path = ?image.path, "skipping duplicate image");
            return false;
        }
        self.images.push(image);
        true
    }

    pub fn images(&self) -> &[ImageResource] {
        &self.images
    }

    pub fn get(&self, id: &str) -> Option<&ImageResource> {
        self.images.iter().find(|image| image.id == id)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.images.iter().any(|image| image.path == path)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Load every reloadable image once. Returns how many loaded.
    ///
    /// Failures are logged; the image stays registered so a later fix on
    /// disk is picked up by the watcher.
    pub fn load_all(&mut self) -> usize {
        let mut loaded = 0;
        for image in self.images.iter_mut().filter(|i| i.kind.is_reloadable()) {
            match image.reload() {
                Ok(()) => loaded += 1,
                Err(e) => warn!(id = %image.id, "initial load failed: {e}"),
            }
        }
        info!(loaded, total = self.images.len(), "initial image load finished");
        loaded
    }
}

impl ResourceRegistry for ImageRegistry {
    fn root(&self) -> &Path {
        &self.root
    }

    fn resources_mut(&mut self) -> Box<dyn Iterator<Item = &mut dyn TrackedResource> + '_> {
        Box::new(
            self.images
                .iter_mut()
                .map(|image| image as &mut dyn TrackedResource),
        )
    }
}
