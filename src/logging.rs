//! 로깅 초기화
//!
//! stdout + `<log_dir>/api.log` 두 곳에 기록합니다.
//! 레벨은 `RUST_LOG`로 조정하며 기본값은 INFO입니다.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// 로그 파일 이름
pub const LOG_FILE_NAME: &str = "api.log";

/// `RUST_LOG`가 없을 때의 기본 레벨
const DEFAULT_LOG_LEVEL: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// 콘솔 전용 로깅 (CLI 단발 명령용)
pub fn init_console() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}

/// 콘솔 + 파일 로깅 (서버용)
///
/// 반환된 guard가 살아있는 동안 파일 기록이 유지됩니다.
pub fn init_with_file(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_rust_log_overrides_default_level() {
        std::env::set_var("RUST_LOG", "debug");
        assert_eq!(env_filter().max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(
            EnvFilter::new(DEFAULT_LOG_LEVEL).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }
}
