//! 日志系统
//!
//! 控制台输出始终开启；`[logging] file_output = true` 时额外写入按天滚动的日志文件。
//! `RUST_LOG` 环境变量优先于配置文件中的级别。
//!
//! ```no_run
//! use graphic_engine::core::{log, Config};
//!
//! let config = Config::default();
//! log::init_logger(&config.logging);
//! tracing::info!(width = 800, height = 600, "Window created");
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::config::{LogLevel, LoggingConfig};

const DEFAULT_LOG_FILE: &str = "graphic_engine.log";

/// 安装全局 subscriber，程序启动时调用一次
pub fn init_logger(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_filter()));

    let console = fmt::layer().with_target(true).with_ansi(true);

    // Option<Layer> 为 None 时相当于没有这一层
    let file = logging.file_output.then(|| {
        let (directory, filename) = split_log_path(&logging.log_file);
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(RollingFileAppender::new(Rotation::DAILY, directory, filename))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();
}

/// 把日志文件路径拆成（目录, 文件名）；缺失部分用当前目录和默认文件名补齐
fn split_log_path(log_file: &str) -> (PathBuf, String) {
    let path = Path::new(log_file);
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (directory, filename)
}

impl LogLevel {
    /// `EnvFilter` 指令字符串
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
