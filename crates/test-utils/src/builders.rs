#![allow(dead_code)]

use std::io::Cursor;

use autoreload::config::{ConfigFile, ImageEntry, RawConfigFile};
use autoreload::types::{FirstScanPolicy, ResourceKind};
use image::{ImageFormat, Rgba, RgbaImage};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn poll_interval(mut self, interval: &str) -> Self {
        self.config.watch.poll_interval = interval.to_string();
        self
    }

    pub fn first_scan(mut self, policy: FirstScanPolicy) -> Self {
        self.config.watch.first_scan = policy;
        self
    }

    pub fn root(mut self, dir: &str) -> Self {
        self.config.images.root = Some(dir.to_string());
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.config.images.include.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.images.exclude.push(pattern.to_string());
        self
    }

    pub fn with_image(self, id: &str, path: &str) -> Self {
        self.with_resource(id, path, ResourceKind::Image)
    }

    pub fn with_resource(mut self, id: &str, path: &str, kind: ResourceKind) -> Self {
        self.config.image.insert(
            id.to_string(),
            ImageEntry {
                path: path.to_string(),
                kind,
            },
        );
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("encoding a PNG in memory cannot fail");
    out.into_inner()
}
