//! Run log - the process-wide file sink installed at fit-start
//!
//! The global `tracing` subscriber can only be set once per process, so the
//! run-log layer is installed on first use behind a reload handle. Installing
//! a new run log swaps the layer's file appender; the previous file stops
//! receiving events.
//!
//! The layer carries its own INFO filter, so `RUST_LOG` never changes what
//! reaches the run log. Hosts that already own the global subscriber can
//! build theirs on top of [`run_log_layer`] instead.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::{self, DefaultFields, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, Layer, Registry};

use crate::error::Result;

/// Timestamp layout stamped on every run log line.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Lowest level written to the run log.
pub const RUN_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

type FileLayer = tracing_subscriber::fmt::Layer<Registry, DefaultFields, RunLogFormat, RollingFileAppender>;

static HANDLE: OnceLock<reload::Handle<Option<FileLayer>, Registry>> = OnceLock::new();
static SUBSCRIBER_INSTALLED: OnceLock<bool> = OnceLock::new();
static ACTIVE_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);

fn active_path() -> MutexGuard<'static, Option<PathBuf>> {
    ACTIVE_PATH.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The run-log layer, filtered at [`RUN_LOG_LEVEL`].
///
/// Only the first call returns a layer: there is one run log per process.
/// It must sit directly on a [`Registry`]; later layers go on top of it.
pub fn run_log_layer() -> Option<impl Layer<Registry> + Send + Sync> {
    let mut created = None;
    HANDLE.get_or_init(|| {
        let (layer, handle) = reload::Layer::new(None::<FileLayer>);
        created = Some(layer);
        handle
    });
    created.map(|layer| layer.with_filter(RUN_LOG_LEVEL))
}

/// Open `path` in append mode and route all INFO+ events to it.
///
/// Any previously installed run log stops receiving events. Returns whether
/// the run-log layer is attached to a live subscriber; when it is not (the
/// host installed its own subscriber without [`run_log_layer`]), the file is
/// created but stays empty.
///
/// # Errors
///
/// Returns [`crate::Error::LogInit`] if the file cannot be opened.
pub fn install_run_log(path: &Path) -> Result<bool> {
    ensure_global_subscriber();

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)?;

    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(RunLogFormat)
        .with_writer(appender);

    let attached = HANDLE
        .get()
        .is_some_and(|handle| handle.reload(Some(layer)).is_ok());
    *active_path() = Some(path.to_path_buf());
    Ok(attached)
}

/// Detach the current run log, if any. Returns its path.
pub fn close_run_log() -> Option<PathBuf> {
    if let Some(handle) = HANDLE.get() {
        // A dropped subscriber has nothing left to detach.
        let _ = handle.reload(None);
    }
    active_path().take()
}

/// Path of the run log most recently installed.
#[must_use]
pub fn active_run_log() -> Option<PathBuf> {
    active_path().clone()
}

fn ensure_global_subscriber() -> bool {
    *SUBSCRIBER_INSTALLED.get_or_init(|| match run_log_layer() {
        Some(layer) => tracing_subscriber::registry().with(layer).try_init().is_ok(),
        None => false,
    })
}

/// `{time} - {message}` with no level or target.
#[derive(Debug, Clone, Copy)]
struct RunLogFormat;

impl<S, N> FormatEvent<S, N> for RunLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{} - ", Local::now().format(LOG_TIME_FORMAT))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
