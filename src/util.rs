use std::path::Path;

use anyhow::Result;
use chrono::Utc;

/// Try to enable ANSI escape sequence support on Windows consoles.
/// Returns true if enabling succeeded (or platform likely already supports ANSI), false otherwise.
#[cfg(windows)]
pub fn try_enable_ansi_on_windows() -> bool {
    enable_ansi_support::enable_ansi_support().is_ok()
}

// On non-Windows platforms ANSI support is typically available by default in
// terminals; provide a no-op fallback to avoid referencing the optional crate.
#[cfg(not(windows))]
pub fn try_enable_ansi_on_windows() -> bool {
    false
}

/// Current UTC time as a sortable `YYYY-MM-DD HH:MM:SS` string. This is the
/// format persisted for the run epoch and per-file transfer times, so plain
/// string comparison in SQL orders correctly.
pub fn formatted_datetime() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Normalize a catalog-relative path:
/// - converts backslashes to forward slashes
/// - collapses repeated slashes
/// - strips any leading slash
///
/// Catalog keys and remote paths are always slash-separated regardless of the
/// local platform.
pub fn normalize_rel_path(p: &str) -> String {
    if p.is_empty() {
        return String::new();
    }
    let mut s = p.replace('\\', "/");
    while s.contains("//") {
        s = s.replace("//", "/");
    }
    while s.starts_with('/') {
        s.remove(0);
    }
    s
}

/// Ensure a non-empty folder string carries exactly one trailing slash so it
/// can be concatenated with a relative path. Empty stays empty (upload into
/// the SFTP login directory).
pub fn ensure_trailing_slash(s: &str) -> String {
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() && s.is_empty() {
        return String::new();
    }
    format!("{}/", trimmed)
}

/// Install the verbose file-logging subscriber: daily-rolling log file under
/// `log_dir`, filter overridable via `RUST_LOG`. The returned guard must stay
/// alive for the duration of the process or buffered lines are lost.
pub fn init_verbose_logging(log_dir: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, "sitepush.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sitepush=debug")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}
