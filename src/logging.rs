//! ロギングシステム
//!
//! ライブラリ側は `log` ファサード経由で出力し、バイナリ側はここで定義する
//! `Logger` を登録する。stderr と任意のログファイルへの追記に対応。

use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    /// `log` クレートのフィルタへ変換
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Error => LogLevel::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidValue {
                key: "log_level".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// ロガー
#[derive(Debug, Clone)]
pub struct Logger {
    level: LogLevel,
    output_stderr: bool,
    output_file: Option<PathBuf>,
}

impl Logger {
    /// デフォルト構築
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            output_stderr: true,
            output_file: None,
        }
    }

    /// 開発者向けロガー
    pub fn for_development() -> Self {
        Self::new(LogLevel::Debug)
    }

    /// ログレベルを取得
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// ログレベルを変更
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// ファイル出力を設定
    pub fn with_file_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// 標準エラー出力を無効化
    pub fn without_stderr(mut self) -> Self {
        self.output_stderr = false;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    fn write_line(&self, message: &str) {
        if self.output_stderr {
            eprintln!("{}", message);
        }

        if let Some(path) = &self.output_file {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", message);
            }
        }
    }

    /// グローバルロガーとして登録
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let filter = self.level.to_filter();
        log::set_logger(Box::leak(Box::new(self)))?;
        log::set_max_level(filter);
        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.should_log(LogLevel::from(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = LogLevel::from(record.level());
        self.write_line(&format!(
            "{}: {} in {}",
            level.tag(),
            record.args(),
            record.target()
        ));
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use tempfile::tempdir;

    #[test]
    fn logger_respects_log_level() {
        let logger = Logger::for_development().without_stderr();
        assert!(logger.should_log(LogLevel::Debug));
        assert!(logger.should_log(LogLevel::Error));

        let info_logger = Logger::for_development()
            .with_level(LogLevel::Info)
            .without_stderr();
        assert_eq!(info_logger.level(), LogLevel::Info);
        assert!(!info_logger.should_log(LogLevel::Debug));
        assert!(info_logger.should_log(LogLevel::Warning));
    }

    #[test]
    fn parses_level_names() {
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn installs_as_global_logger() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("global.log");
        Logger::new(LogLevel::Warning)
            .without_stderr()
            .with_file_output(&path)
            .install()
            .unwrap();
        assert_eq!(log::max_level(), log::LevelFilter::Warn);

        log::warn!(target: "linepatch::test", "registered");
        log::info!(target: "linepatch::test", "filtered");
        // 並行するテストの記録が混ざることがあるので対象の行だけを見る
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written
            .lines()
            .any(|line| line == "WARNING: registered in linepatch::test"));
        assert!(!written.contains("filtered"));

        // 二重登録はエラーとして返る
        assert!(Logger::for_development().without_stderr().install().is_err());
    }

    #[test]
    fn writes_records_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("linepatch.log");
        let logger = Logger::new(LogLevel::Info)
            .without_stderr()
            .with_file_output(&path);

        logger.log(
            &log::Record::builder()
                .level(log::Level::Info)
                .target("linepatch::engine")
                .args(format_args!("batch applied"))
                .build(),
        );
        logger.log(
            &log::Record::builder()
                .level(log::Level::Debug)
                .target("linepatch::engine")
                .args(format_args!("hidden"))
                .build(),
        );

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "INFO: batch applied in linepatch::engine\n");
    }
}
