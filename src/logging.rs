//! Logging setup
//!
//! Console output is always on. Set `GAME_LOG_DIR` to also write a daily
//! rolling log file; keep the returned guard alive until shutdown so buffered
//! lines are flushed.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVE: &str = "game_agent_sdk=info";

/// File name prefix of rolling log files
const LOG_FILE_PREFIX: &str = "game-agent.log";

/// Build the filter from a `RUST_LOG`-style value, falling back to
/// [`DEFAULT_DIRECTIVE`] when it is missing or unparsable
pub fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber
///
/// Returns the file writer's guard when `GAME_LOG_DIR` is set.
pub fn init_logging() -> anyhow::Result<Option<WorkerGuard>> {
    let filter = build_filter(env::var("RUST_LOG").ok().as_deref());

    let (file_layer, guard) = match env::var_os("GAME_LOG_DIR").map(PathBuf::from) {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(build_filter(None).to_string().contains("game_agent_sdk"));
        assert!(build_filter(Some("  ")).to_string().contains("game_agent_sdk"));
    }

    #[test]
    fn test_explicit_filter() {
        let filter = build_filter(Some("reqwest=debug"));
        let rendered = filter.to_string();
        assert!(rendered.contains("reqwest"));
        assert!(!rendered.contains("game_agent_sdk"));
    }
}
