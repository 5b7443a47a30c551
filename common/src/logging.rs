//! Common logging initializer
//!
//! Everything goes to the console (compact or hierarchical) and, if asked for, is also
//! appended to a log file that survives restarts.
//!

use std::path::Path;

use eyre::{eyre, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Build the filter: `RUST_LOG` wins, otherwise use the configured level.
///
pub fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()))
}

#[tracing::instrument]
pub fn init_logging(
    name: &'static str,
    level: &str,
    use_tree: bool,
    use_file: Option<&Path>,
) -> Result<()> {
    // Initialise logging early
    //
    let filter = log_filter(level);

    // Do we want hierarchical output?
    //
    let (tree, compact) = if use_tree {
        let tree = HierarchicalLayer::new(2)
            .with_ansi(true)
            .with_span_retrace(true)
            .with_span_modes(true)
            .with_targets(true)
            .with_bracketed_fields(true);
        (Some(tree), None)
    } else {
        let compact = fmt::layer().with_target(false).compact();
        (None, Some(compact))
    };

    // Log to file?
    //
    let file = match use_file {
        Some(path) => {
            let fname = path
                .file_name()
                .ok_or_else(|| eyre!("{} log file {:?} has no file name", name, path))?;
            let dir = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => Path::new("."),
            };

            // Basic append-only file, never rotated.  Bad paths fail here.
            //
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(fname.to_string_lossy())
                .build(dir)
                .map_err(|e| eyre!("{}: can not open log file {:?}: {}", name, path, e))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(file_appender),
            )
        }
        None => None,
    };

    // Combine filters & exporters
    //
    tracing_subscriber::registry()
        .with(filter)
        .with(tree)
        .with(compact)
        .with(file)
        .try_init()?;

    Ok(())
}
