// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod console;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod redraw;
pub mod registry;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::clock::SystemClock;
use crate::config::load_and_validate;
use crate::config::model::ConfigFile;
use crate::console::run_console;
use crate::engine::{ControlEvent, EnabledFlag, Runtime, TokioTimer, WatchController};
use crate::fs::{FileSystem, RealFileSystem};
use crate::redraw::TracingRedraw;
use crate::registry::{ImageRegistry, ResourceRegistry, TrackedResource, build_registry};
use crate::watch::{ChangeDetector, ReloadScanner};

/// Capacity of the runtime event channel. Ticks are dropped, not queued,
/// when it is full.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and the image registry
/// - the watch controller, its timer and the runtime loop
/// - the stdin console
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone();
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config {:?}", config_path))?;

    let base_dir = config_root_dir(&config_path);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let mut registry = build_registry(&cfg, &base_dir, Arc::clone(&fs))?;

    if args.dry_run {
        print_dry_run(&cfg, &registry, fs.as_ref());
        return Ok(());
    }

    registry.load_all();

    let (rt_tx, rt_rx) = mpsc::channel::<ControlEvent>(EVENT_CHANNEL_CAPACITY);

    let scanner = ReloadScanner::new(ChangeDetector::new(fs), cfg.first_scan());
    let flag = EnabledFlag::new();
    let controller = WatchController::new(
        TokioTimer::new(rt_tx.clone()),
        SystemClock,
        scanner,
        cfg.poll_interval(),
        flag.clone(),
    );
    let runtime = Runtime::new(
        controller,
        rt_rx,
        Box::new(registry),
        Box::new(TracingRedraw::new()),
    );

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(ControlEvent::Shutdown).await;
        });
    }

    // stdin console acting as the host UI.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            if let Err(e) = run_console(stdin, &mut stdout, tx, flag).await {
                warn!("console stopped: {e}");
            }
        });
    }

    if args.enable {
        rt_tx
            .send(ControlEvent::Toggle)
            .await
            .map_err(|_| anyhow!("runtime channel closed before startup"))?;
    }
    drop(rt_tx);

    info!(
        config = ?config_path,
        interval = ?cfg.poll_interval(),
        first_scan = %cfg.first_scan(),
        "auto-reload ready; type 'toggle' to switch it on or off"
    );

    runtime.run().await?;
    Ok(())
}

/// Directory that relative image paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "assets/Autoreload.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Autoreload.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: print settings and the resolved registry.
fn print_dry_run(cfg: &ConfigFile, registry: &ImageRegistry, fs: &dyn FileSystem) {
    println!("autoreload dry-run");
    println!("  watch.poll_interval = {:?}", cfg.poll_interval());
    println!("  watch.first_scan = {}", cfg.first_scan());
    println!("  images.root = {}", registry.root().display());
    println!();

    println!("images ({}):", registry.len());
    for image in registry.images() {
        let path = image.file_path();
        let note = if !image.kind().is_reloadable() {
            " (not reloadable)"
        } else if !fs.is_file(path) {
            " (missing)"
        } else {
            ""
        };
        println!("  - {} [{}]{note}", image.id(), image.kind());
        println!("      path: {}", path.display());
    }

    debug!("dry-run complete (nothing loaded)");
}
