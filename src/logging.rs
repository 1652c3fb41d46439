//! Tracing initialization.
//! Builds a subscriber with EnvFilter, supports compact or JSON formats, and optional file logging.
//!
//! Behavior:
//! - Log level is driven by LogLevel (no RUST_LOG override here).
//! - If `log_file` is provided and passes safety checks, a non-blocking file layer is added.
//! - File logging is refused if any ancestor of the file path is a symlink.

use anyhow::Result;
use chrono::Local;
use reorg_move::output as out;
use reorg_move::{path_has_symlink_ancestor, LogLevel};
use std::fmt as stdfmt;
use std::fs::OpenOptions;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{registry, Layer, Registry};

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync + 'static>;

/// Local wall-clock timestamps (YYYY-MM-DD HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: &LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::INFO,
        LogLevel::Info => LevelFilter::DEBUG,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

fn fmt_layer<W>(writer: W, json: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        tsfmt::layer()
            .json()
            .with_timer(LocalHumanTime)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    } else {
        tsfmt::layer()
            .compact()
            .with_timer(LocalHumanTime)
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed()
    }
}

/// Open `path` for appending behind a non-blocking writer, or explain on stderr why not.
fn maybe_open_non_blocking_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(true) => {
            eprintln!(
                "Refusing to enable file logging: ancestor of {} is a symlink; proceeding without file logging.",
                path.display()
            );
            return None;
        }
        Err(e) => {
            eprintln!(
                "Error checking log path {} for symlinks: {}; proceeding without file logging.",
                path.display(),
                e
            );
            return None;
        }
        Ok(false) => {}
    }

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            None
        }
    }
}

/// Initialize tracing based on LogLevel and format. Returns the WorkerGuard of
/// the file appender, if any; hold it until exit so buffered lines are flushed.
pub fn init_tracing(
    lvl: &LogLevel,
    log_file: Option<&Path>,
    json: bool,
) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::default().add_directive(to_level_filter(lvl).into());
    let ansi = atty::is(atty::Stream::Stdout);

    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(std::io::stdout, json, ansi)];
    let mut guard = None;

    if let Some(path) = log_file {
        match maybe_open_non_blocking_writer(path) {
            Some((writer, g)) => {
                layers.push(fmt_layer(writer, json, false));
                guard = Some(g);
            }
            None => out::print_warn(&format!(
                "Requested file logging to '{}' was not enabled. Check that the parent directory is writable and that no ancestor is a symlink. Logs will continue to stdout.",
                path.display()
            )),
        }
    }

    registry().with(env_filter).with(layers).try_init()?;
    Ok(guard)
}
