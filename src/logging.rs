// src/logging.rs

use crate::error::{ImportError, Result};
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// 错误日志：只记录 ERROR，追加写入，每行带时间戳
pub(crate) fn error_log_layer<S>(error_log: &Path) -> Result<(impl Layer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file_name = error_log
        .file_name()
        .ok_or_else(|| ImportError::InvalidInput(format!("Invalid error log path: {}", error_log.display())))?;
    let dir = match error_log.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::ERROR);
    Ok((layer, guard))
}

/// 初始化全局日志。控制台输出默认关闭，--verbose 或设置 RUST_LOG 时输出到 stderr。
/// 返回的 guard 要保持到程序退出，否则缓冲中的日志会丢失。
pub fn init_logging(error_log: &Path, verbose: bool) -> Result<WorkerGuard> {
    let (error_layer, guard) = error_log_layer(error_log)?;

    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => Some(filter),
        Err(_) if verbose => Some(EnvFilter::new("leakatlas=debug")),
        Err(_) => None,
    };
    let console_layer = console_filter.map(|filter| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter)
    });

    tracing_subscriber::registry()
        .with(console_layer)
        .with(error_layer)
        .try_init()
        .map_err(|e| ImportError::Logging(e.to_string()))?;

    Ok(guard)
}
