//! Logging of the application.

use std::{io, sync::OnceLock};

use tracing::{Level, Metadata};
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

/// Levels written into the `stderr` instead of the `stdout`.
const STDERR_LEVELS: &[Level] = &[Level::WARN, Level::ERROR];

/// Maximum [`Level`] being written.
///
/// [`Level::INFO`] is used until [`set_max_level()`] is called.
static MAX_LEVEL: OnceLock<Level> = OnceLock::new();

/// Installs the global logger writing warnings and errors into the `stderr`,
/// and everything else into the `stdout`.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| is_written(meta, false))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| is_written(meta, true))),
        )
        .init();
}

/// Sets the maximum [`Level`] of the written events.
///
/// Only the first call has effect.
pub fn set_max_level(level: impl Into<Level>) {
    if MAX_LEVEL.set(level.into()).is_err() {
        tracing::warn!("maximum log level is already set");
    }
}

/// Checks whether an event described by the provided [`Metadata`] is written
/// into the `stderr` (if `stderr` is `true`) or the `stdout` otherwise.
fn is_written(meta: &Metadata<'_>, stderr: bool) -> bool {
    meta.is_span()
        || accepts(
            *meta.level(),
            MAX_LEVEL.get().copied().unwrap_or(Level::INFO),
            stderr,
        )
}

/// Checks whether an event of the `level` goes to the `stderr` (if `stderr`
/// is `true`) or the `stdout` otherwise, with the provided `max` [`Level`].
fn accepts(level: Level, max: Level, stderr: bool) -> bool {
    STDERR_LEVELS.contains(&level) == stderr && max >= level
}

#[cfg(test)]
mod spec {
    use tracing::Level;

    use super::accepts;

    #[test]
    fn splits_streams_by_level() {
        assert!(accepts(Level::INFO, Level::TRACE, false));
        assert!(!accepts(Level::INFO, Level::TRACE, true));
        assert!(accepts(Level::WARN, Level::TRACE, true));
        assert!(!accepts(Level::ERROR, Level::TRACE, false));
    }

    #[test]
    fn drops_events_above_max_level() {
        assert!(!accepts(Level::DEBUG, Level::INFO, false));
        assert!(accepts(Level::DEBUG, Level::DEBUG, false));
        assert!(!accepts(Level::WARN, Level::ERROR, true));
        assert!(accepts(Level::ERROR, Level::ERROR, true));
    }
}
