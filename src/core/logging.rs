//! Logging Module
//!
//! Structured logging for the assistant:
//! - Daily-rolling JSON log files (tracing-appender)
//! - `log` macros bridged into `tracing` (tracing-log)
//! - Background gzip compression of older log files (flate2)
//! - Shared syntect resources for terminal Markdown rendering

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use flate2::write::GzEncoder;
use flate2::Compression;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "tabletop-oracle.log";

// ============================================================================
// Static Resources (Lazy Loaded)
// ============================================================================

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

pub(crate) fn get_syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

pub(crate) fn get_theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

// ============================================================================
// Initialization
// ============================================================================

/// Log directory below the application data directory.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// Initialize logging for TUI mode: a daily-rolling JSON file layer only,
/// since ratatui owns the terminal while in raw/alternate-screen mode.
///
/// Keep the returned guard alive for the lifetime of the program, or
/// buffered log lines are lost.
pub fn init_tui(log_dir: &Path) -> WorkerGuard {
    let (non_blocking, guard) = file_writer(log_dir);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter());

    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    finish_init(log_dir);
    guard
}

fn file_writer(
    log_dir: &Path,
) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    tracing_appender::non_blocking(file_appender)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
}

fn finish_init(log_dir: &Path) {
    // Usually already installed by the subscriber's own `log` bridge.
    if let Err(e) = tracing_log::LogTracer::init() {
        log::debug!("LogTracer already set: {}", e);
    }

    let log_dir_clone = log_dir.to_path_buf();
    std::thread::spawn(move || {
        compress_old_logs(&log_dir_clone);
    });

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );
}

// ============================================================================
// Log Compression
// ============================================================================

/// Whether a file in the log directory is a finished log awaiting compression.
fn should_compress(name: &str, today_suffix: &str) -> bool {
    name.starts_with(&format!("{LOG_FILE_PREFIX}."))
        && !name.ends_with(today_suffix)
        && !name.ends_with(".gz")
}

/// Compress old log files in the background
fn compress_old_logs(log_dir: &Path) {
    let today_suffix = chrono::Local::now().format("%Y-%m-%d").to_string();

    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if should_compress(name, &today_suffix) {
            if let Err(e) = compress_file(&path) {
                log::warn!("Failed to compress old log {:?}: {}", path, e);
            } else {
                log::info!("Compressed old log: {:?}", path);
            }
        }
    }
}

fn compress_file(path: &Path) -> io::Result<()> {
    let file = fs::File::open(path)?;
    let mut reader = io::BufReader::new(file);

    let mut gz_path_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_path_name.push(".gz");
    let parent_dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No parent directory"))?;
    let gz_path = parent_dir.join(gz_path_name);

    if gz_path.exists() {
        return Ok(());
    }

    let output = fs::File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());

    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;

    Ok(())
}
