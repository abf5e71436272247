use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging: JSON lines to `log_file`, warnings and errors to stderr.
///
/// The level comes from `RUST_LOG` (default `info`). Keep the returned guard
/// alive for as long as the process should write the log file.
pub fn init(log_file: &Path) -> std::io::Result<WorkerGuard> {
    let dir = log_file.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let file_name = log_file
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "package-monitor.log".into());
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr)
                .with_filter(LevelFilter::WARN),
        )
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_log_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("nested/package-monitor.log");

        let guard = init(&log_file).unwrap();
        tracing::info!("logging initialized");
        drop(guard);

        assert!(log_file.parent().unwrap().is_dir());
    }
}
