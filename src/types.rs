use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What the scanner does when it has no previous poll boundary.
///
/// - `ReloadAll`: every resolvable file counts as changed, so each image is
///   reloaded once (default).
/// - `Seed`: nothing is reloaded; the caller only records the boundary.
///
/// The controller always seeds a boundary in `start()`, so this only matters
/// when `scan` is invoked directly without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstScanPolicy {
    #[default]
    ReloadAll,
    Seed,
}

impl fmt::Display for FirstScanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirstScanPolicy::ReloadAll => f.write_str("reload_all"),
            FirstScanPolicy::Seed => f.write_str("seed"),
        }
    }
}

impl FromStr for FirstScanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reload_all" | "reload-all" => Ok(FirstScanPolicy::ReloadAll),
            "seed" => Ok(FirstScanPolicy::Seed),
            other => Err(format!(
                "invalid first_scan: {other} (expected \"reload_all\" or \"seed\")"
            )),
        }
    }
}

/// Kind of a registry item.
///
/// Only `Image` is backed by a user file on disk; the other kinds are
/// generated by the host and never reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[default]
    Image,
    Multilayer,
    UvTest,
    RenderResult,
    Compositing,
}

impl ResourceKind {
    /// Whether the watcher may reload items of this kind.
    pub fn is_reloadable(self) -> bool {
        matches!(self, ResourceKind::Image)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Multilayer => "multilayer",
            ResourceKind::UvTest => "uv_test",
            ResourceKind::RenderResult => "render_result",
            ResourceKind::Compositing => "compositing",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" => Ok(ResourceKind::Image),
            "multilayer" => Ok(ResourceKind::Multilayer),
            "uv_test" => Ok(ResourceKind::UvTest),
            "render_result" => Ok(ResourceKind::RenderResult),
            "compositing" => Ok(ResourceKind::Compositing),
            other => Err(format!("unknown resource kind: {other}")),
        }
    }
}
