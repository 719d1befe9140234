// src/errors.rs

//! Crate-wide error types.
//!
//! Host-level failures (config, IO while building the registry) use
//! [`AutoreloadError`]. The two per-resource failure kinds the scanner has to
//! contain are separate enums so tests can match on them directly.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutoreloadError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AutoreloadError>;

/// The modification time of a resource's backing file could not be read.
///
/// The change detector treats this as "unchanged".
#[derive(Error, Debug)]
pub enum ResourceUnavailable {
    #[error("file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    #[error("cannot query {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResourceUnavailable {
    /// Classify an IO error raised while querying `path`.
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => ResourceUnavailable::NotFound(path),
            io::ErrorKind::PermissionDenied => ResourceUnavailable::PermissionDenied(path),
            _ => ResourceUnavailable::Io { path, source: err },
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            ResourceUnavailable::NotFound(path) => path,
            ResourceUnavailable::PermissionDenied(path) => path,
            ResourceUnavailable::Io { path, .. } => path,
        }
    }
}

/// Reloading a single resource failed. Contained by the scanner.
#[derive(Error, Debug)]
pub enum ReloadFailed {
    #[error("failed to read {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let unavailable = ResourceUnavailable::from_io("/tmp/a.png", err);
        assert!(matches!(unavailable, ResourceUnavailable::NotFound(_)));
        assert_eq!(unavailable.to_string(), "file not found: \"/tmp/a.png\"");
    }

    #[test]
    fn io_permission_denied_maps_to_permission_denied() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let unavailable = ResourceUnavailable::from_io("/root/b.png", err);
        assert!(matches!(unavailable, ResourceUnavailable::PermissionDenied(_)));
        assert_eq!(unavailable.path(), &PathBuf::from("/root/b.png"));
    }

    #[test]
    fn other_io_errors_keep_their_source() {
        let err = io::Error::other("disk on fire");
        let unavailable = ResourceUnavailable::from_io("c.png", err);
        assert!(matches!(unavailable, ResourceUnavailable::Io { .. }));
        assert!(unavailable.to_string().contains("disk on fire"));
    }

    #[test]
    fn read_failure_display() {
        let err = ReloadFailed::Read {
            path: PathBuf::from("x.png"),
            reason: "File not found".to_string(),
        };
        assert_eq!(err.to_string(), "failed to read \"x.png\": File not found");
    }
}
