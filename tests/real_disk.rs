// tests/real_disk.rs

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use autoreload::clock::Timestamp;
use autoreload::config::load_and_validate;
use autoreload::fs::{FileSystem, RealFileSystem};
use autoreload::redraw::TracingRedraw;
use autoreload::registry::{ResourceRegistry, build_registry};
use autoreload::types::FirstScanPolicy;
use autoreload::watch::{ChangeDetector, ReloadScanner};
use autoreload_test_utils::builders::png_bytes;
use autoreload_test_utils::init_tracing;

fn write_with_mtime(path: &Path, bytes: &[u8], mtime: SystemTime) {
    fs::write(path, bytes).unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

#[test]
fn edited_png_is_reloaded_with_new_dimensions() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let base = SystemTime::now() - Duration::from_secs(3600);

    fs::create_dir_all(dir.path().join("tex")).unwrap();
    write_with_mtime(&dir.path().join("tex/wood.png"), &png_bytes(2, 2), base);
    write_with_mtime(&dir.path().join("tex/stone.png"), &png_bytes(3, 3), base);
    fs::write(dir.path().join("tex/readme.txt"), "not an image").unwrap();

    let config_path = dir.path().join("Autoreload.toml");
    fs::write(
        &config_path,
        r#"
[watch]
poll_interval = "250ms"

[images]
root = "tex"
include = ["*.png"]
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&config_path).unwrap();
    let fs_impl: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let mut registry = build_registry(&cfg, dir.path(), Arc::clone(&fs_impl)).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.load_all(), 2);
    assert_eq!(registry.get("wood.png").unwrap().loaded().unwrap().width, 2);

    let boundary = Timestamp::from_system_time(base + Duration::from_secs(60));
    write_with_mtime(
        &dir.path().join("tex/wood.png"),
        &png_bytes(4, 3),
        base + Duration::from_secs(120),
    );

    let scanner = ReloadScanner::new(ChangeDetector::new(fs_impl), FirstScanPolicy::ReloadAll);
    let redraw = TracingRedraw::new();
    let report = scanner.scan_report(&mut registry, &redraw, Some(boundary));

    assert_eq!(report.reloaded, vec!["wood.png".to_string()]);
    assert_eq!(redraw.requests(), 1);
    let wood = registry.get("wood.png").unwrap();
    assert_eq!(wood.generation(), 2);
    assert_eq!((wood.loaded().unwrap().width, wood.loaded().unwrap().height), (4, 3));
    assert_eq!(registry.get("stone.png").unwrap().generation(), 1);
}

#[test]
fn corrupt_save_keeps_previous_image() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let base = SystemTime::now() - Duration::from_secs(3600);
    let path = dir.path().join("logo.png");
    write_with_mtime(&path, &png_bytes(8, 8), base);

    let config_path = dir.path().join("Autoreload.toml");
    fs::write(&config_path, "[image.logo]\npath = \"logo.png\"\n").unwrap();

    let cfg = load_and_validate(&config_path).unwrap();
    let fs_impl: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let mut registry = build_registry(&cfg, dir.path(), Arc::clone(&fs_impl)).unwrap();
    registry.load_all();

    // Half-written file from an editor.
    write_with_mtime(&path, b"\x89PNG\r\n\x1a\ngarbage", base + Duration::from_secs(30));

    let scanner = ReloadScanner::new(ChangeDetector::new(fs_impl), FirstScanPolicy::ReloadAll);
    let redraw = TracingRedraw::new();
    let report = scanner.scan_report(
        &mut registry,
        &redraw,
        Some(Timestamp::from_system_time(base)),
    );

    assert_eq!(report.failed, vec!["logo".to_string()]);
    assert_eq!(redraw.requests(), 0);
    let logo = registry.get("logo").unwrap();
    assert_eq!(logo.generation(), 1);
    assert_eq!(logo.loaded().unwrap().width, 8);
}

#[test]
fn deleting_a_file_between_scans_is_harmless() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let base = SystemTime::now() - Duration::from_secs(3600);
    let path = dir.path().join("gone.png");
    write_with_mtime(&path, &png_bytes(1, 1), base);
    fs::write(
        dir.path().join("Autoreload.toml"),
        "[image.gone]\npath = \"gone.png\"\n",
    )
    .unwrap();

    let cfg = load_and_validate(dir.path().join("Autoreload.toml")).unwrap();
    let fs_impl: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let mut registry = build_registry(&cfg, dir.path(), Arc::clone(&fs_impl)).unwrap();
    fs::remove_file(&path).unwrap();

    let scanner = ReloadScanner::new(ChangeDetector::new(fs_impl), FirstScanPolicy::ReloadAll);
    let redraw = TracingRedraw::new();

    assert!(!scanner.scan(&mut registry, &redraw, None));
    assert_eq!(registry.resources_mut().count(), 1);
}
