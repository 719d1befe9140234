// src/watch/mod.rs

//! Change detection and reloading.
//!
//! This module is responsible for:
//! - Comparing a resource's file mtime against the last poll boundary
//!   ([`detect`]).
//! - Walking the registry once per tick, reloading what changed and asking
//!   the host for a single redraw ([`scanner`]).
//!
//! It does **not** own any timing or enabled/disabled state; that lives in
//! [`crate::engine`].

pub mod detect;
pub mod path_utils;
pub mod scanner;

pub use detect::ChangeDetector;
pub use scanner::{ReloadScanner, ScanReport};
