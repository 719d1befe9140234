// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{FirstScanPolicy, ResourceKind};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// poll_interval = "1s"
/// first_scan = "reload_all"
///
/// [images]
/// root = "textures"
/// include = ["**/*.png"]
/// exclude = ["**/*.tmp.png"]
///
/// [image.logo]
/// path = "ui/logo.png"
/// ```
///
/// All sections are optional and have reasonable defaults. This is the
/// unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub images: ImagesSection,

    /// Explicitly tracked images from `[image.<id>]`.
    ///
    /// Keys are the resource ids.
    #[serde(default)]
    pub image: BTreeMap<String, ImageEntry>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Timer interval as a duration string (`"500ms"`, `"1s"`, ...).
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    #[serde(default)]
    pub first_scan: FirstScanPolicy,
}

fn default_poll_interval() -> String {
    "1s".to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            first_scan: FirstScanPolicy::default(),
        }
    }
}

/// `[images]` section: discover images under `root` by glob.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesSection {
    /// Directory to scan, relative to the config file. Defaults to the
    /// config file's directory.
    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[image.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageEntry {
    /// Path to the file, relative to the registry root unless absolute.
    pub path: String,

    #[serde(default)]
    pub kind: ResourceKind,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    poll_interval: Duration,
    first_scan: FirstScanPolicy,
    images: ImagesSection,
    image: BTreeMap<String, ImageEntry>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        poll_interval: Duration,
        first_scan: FirstScanPolicy,
        images: ImagesSection,
        image: BTreeMap<String, ImageEntry>,
    ) -> Self {
        Self {
            poll_interval,
            first_scan,
            images,
            image,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn first_scan(&self) -> FirstScanPolicy {
        self.first_scan
    }

    pub fn images_section(&self) -> &ImagesSection {
        &self.images
    }

    pub fn images(&self) -> &BTreeMap<String, ImageEntry> {
        &self.image
    }
}
