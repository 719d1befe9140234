// src/registry/mod.rs

//! The host's collection of loaded resources.
//!
//! The watcher core only talks to the two traits defined here: it walks a
//! [`ResourceRegistry`] once per scan and calls [`TrackedResource::reload`]
//! on the items whose files changed. It never creates, stores or drops
//! resources itself.
//!
//! [`ImageRegistry`] is the concrete registry used by the `autoreload`
//! binary; [`discover`] builds one from the config file.

pub mod discover;
pub mod images;

use std::path::Path;

use crate::errors::ReloadFailed;
use crate::types::ResourceKind;

pub use discover::{ImagePatterns, build_registry, collect_matching_files};
pub use images::{ImageRegistry, ImageResource, LoadedImage};

/// A view over one registry item.
pub trait TrackedResource {
    fn id(&self) -> &str;

    /// Path of the backing file. May be relative to [`ResourceRegistry::root`].
    fn file_path(&self) -> &Path;

    fn kind(&self) -> ResourceKind;

    /// Re-read the backing file into memory.
    fn reload(&mut self) -> Result<(), ReloadFailed>;
}

/// Live collection of resources, iterated in registry order.
pub trait ResourceRegistry {
    /// Directory that relative resource paths are resolved against.
    fn root(&self) -> &Path;

    fn resources_mut(&mut self) -> Box<dyn Iterator<Item = &mut dyn TrackedResource> + '_>;
}
