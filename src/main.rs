//! Live Inspector - Main Entry Point
//!
//! Headless front end: connects to a running engine (or the built-in mock),
//! keeps the scene in sync and prints the status console and scene changes.

use anyhow::Context;
use clap::Parser;
use live_inspector::{
    backend::{EngineApi, HttpEngineApi, InspectorBackend, MockEngine, SessionMessage},
    config::InspectorConfig,
    sync::{Session, SystemClock},
};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,live_inspector=debug";

#[derive(Parser, Debug)]
#[command(name = "live-inspector")]
#[command(about = "Live scene inspector for a running engine")]
#[command(version)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Engine API base URL, overrides the config file
    #[arg(short, long)]
    url: Option<String>,

    /// Use the in-memory mock engine instead of a real one
    #[arg(long)]
    mock: bool,

    /// Export the scene document to this file and exit
    #[arg(long, num_args = 0..=1, default_missing_value = "scene.json")]
    export: Option<PathBuf>,

    /// Write a default config file to this path and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,

    /// Stop after this many seconds instead of running until killed
    #[arg(long)]
    duration_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        InspectorConfig::default()
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => InspectorConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => InspectorConfig::load_or_default(None),
    };
    if let Some(url) = &args.url {
        config.connection.base_url = url.clone();
        config.validate()?;
    }

    let _log_guard = init_logging(&config);

    tracing::info!("Starting live inspector against {}", config.connection.base_url);

    let api: Box<dyn EngineApi> = if args.mock {
        tracing::info!("Using mock engine");
        Box::new(MockEngine::sample().paused(true))
    } else {
        Box::new(HttpEngineApi::new(&config.connection)?)
    };

    if let Some(path) = &args.export {
        let mut session = Session::new(&config, api, Arc::new(SystemClock));
        session.export_scene(path)?;
        println!("Scene exported to {}", path.display());
        return Ok(());
    }

    let show_debug = config.console.show_debug;
    let (backend, handle) = InspectorBackend::new(config, api, Arc::new(SystemClock));
    let running = backend.stop_handle();
    let worker = std::thread::spawn(move || backend.run());

    let deadline = args
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));

    'ui: loop {
        for msg in handle.drain() {
            match msg {
                SessionMessage::Console(entry) => println!("{} {}", entry.level, entry),
                SessionMessage::SnapshotReplaced(entities) => {
                    tracing::debug!("Scene has {} actors", entities.len());
                }
                SessionMessage::Stats(stats) => {
                    tracing::debug!(
                        "Engine reports {} actors, {} components",
                        stats.actor_count,
                        stats.component_count
                    );
                }
                SessionMessage::Shutdown => break 'ui,
                other if show_debug => println!("debug {:?}", other),
                _ => {}
            }
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            handle.shutdown();
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    // Signal backend to stop and wait for it
    tracing::info!("Shutting down...");
    running.store(false, Ordering::SeqCst);
    if worker.join().is_err() {
        anyhow::bail!("session worker panicked");
    }

    Ok(())
}

/// Install the tracing subscriber; the returned guard flushes the log file
fn init_logging(config: &InspectorConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.logging.filter.as_deref().unwrap_or(DEFAULT_FILTER))
        })
    };

    match &config.logging.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "live-inspector.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter())
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter())
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    }
}
