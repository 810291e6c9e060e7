//! Tracing setup for the binaries.
//!
//! Logs always go to stderr: the CLI prints JSON on stdout and the MCP
//! server speaks its protocol there.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "TASKBOT_LOG";

/// Filter used when nothing else is configured.
pub const DEFAULT_FILTER: &str = "warn";

/// Pick the filter directive: `TASKBOT_LOG`, then `RUST_LOG`, then the
/// config file, then [`DEFAULT_FILTER`]. Blank or unparseable directives
/// are skipped.
#[must_use]
pub fn resolve_filter(
    taskbot_log: Option<&str>,
    rust_log: Option<&str>,
    configured: Option<&str>,
) -> EnvFilter {
    [taskbot_log, rust_log, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|raw| !raw.is_empty() && raw.len() <= 4096)
        .find_map(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(configured: Option<&str>) {
    let taskbot_log = std::env::var(LOG_ENV).ok();
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = resolve_filter(taskbot_log.as_deref(), rust_log.as_deref(), configured);

    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taskbot_log_wins() {
        let filter = resolve_filter(Some("taskbot=debug"), Some("info"), Some("error"));
        assert_eq!(filter.to_string(), "taskbot=debug");
    }

    #[test]
    fn test_falls_back_to_rust_log_then_config() {
        assert_eq!(resolve_filter(None, Some("info"), Some("error")).to_string(), "info");
        assert_eq!(resolve_filter(Some("  "), None, Some("error")).to_string(), "error");
    }

    #[test]
    fn test_default_is_warn() {
        assert_eq!(resolve_filter(None, None, None).to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn test_invalid_directive_is_skipped() {
        let filter = resolve_filter(Some("taskbot=loud"), None, Some("debug"));
        assert_eq!(filter.to_string(), "debug");
    }
}
