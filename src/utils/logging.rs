use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

pub const CLI_PREFIX: &str = "cli";
pub const LOG_DIR_NAME: &str = "logs";
const KEPT_LOG_FILES: usize = 5;

fn file_appender(prefix: &str, application_data_path: &Path) -> Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(prefix)
        .build(application_data_path.join(LOG_DIR_NAME))?)
}

/// Only this crate's events are recorded. An explicit level wins over `RUST_LOG`.
fn crate_filter(log_level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = log_level
        .map(|v| v.to_string().to_lowercase())
        .or(env_level)
        .unwrap_or_else(|| "debug".into());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

/// Logs go into `<application_data_path>/logs`. Stderr gets a copy only when `show_std` is set,
/// otherwise it would mix with the command output.
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = file_appender(prefix, application_data_path)?;
    let stderr = std::io::stderr.with_filter(move |_| show_std);
    let filter = crate_filter(log_level, std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stderr.and(appender))
        .with_ansi(false)
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .try_init();
});
