//! エラーハンドリングシステム
//!
//! パッチエンジン全体で使用される統一されたエラー型を定義する。
//! どのエラーもバッチ全体を中断させ、内部でのリトライは行わない。

use crate::edit::EditKind;
use std::path::Path;
use thiserror::Error;

/// パッチエンジン全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// 行番号が現在のバッファ長の範囲外
    #[error(
        "Line number out of range for {kind} operation: requested {}, document has {current_len} lines",
        span_label(.start, .end)
    )]
    OutOfRange {
        kind: EditKind,
        start: i64,
        end: i64,
        current_len: usize,
    },

    /// ファイル操作エラー
    #[error("File operation failed: {0}")]
    File(#[from] FileError),

    /// 構造的に不正な編集指定
    #[error("Malformed edit batch: {0}")]
    Malformed(#[from] MalformedEditError),

    /// 重なり合う編集（OverlapPolicy::Reject 時のみ）
    #[error("Edits #{first} and #{second} touch overlapping lines")]
    Overlap { first: usize, second: usize },

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

fn span_label(start: &i64, end: &i64) -> String {
    if start == end {
        format!("line {}", start)
    } else {
        format!("lines {}..={}", start, end)
    }
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl FileError {
    /// パス情報付きで `std::io::Error` を変換
    pub fn from_io(error: std::io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied { path },
            _ => FileError::Io {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

/// 編集バッチの構造エラー
///
/// ドキュメントの長さを知らない段階で検出されるもののみを扱う。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedEditError {
    #[error("batch is not a valid edits document: {message}")]
    Json { message: String },

    #[error("edit #{index} does not match any edit shape: {message}")]
    Shape { index: usize, message: String },

    #[error("edit #{index}: delete range start {start} is greater than end {end}")]
    InvertedRange { index: usize, start: i64, end: i64 },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    /// 呼び出し側が修正したバッチを再送すれば解決するもの
    Warning,
    /// 環境側の問題
    Error,
}

impl PatchError {
    /// エラーレベルを判定
    pub fn level(&self) -> ErrorLevel {
        match self {
            PatchError::OutOfRange { .. }
            | PatchError::Malformed(_)
            | PatchError::Overlap { .. } => ErrorLevel::Warning,
            PatchError::File(_) | PatchError::Config(_) => ErrorLevel::Error,
        }
    }

    /// 最新の番号付きビューを取り直してバッチを作り直せば回復できるか
    pub fn is_retryable_with_fresh_view(&self) -> bool {
        matches!(self, PatchError::OutOfRange { .. } | PatchError::Overlap { .. })
    }
}

/// エラー発生時にログを残すためのトレイト
pub trait LogOnError<T> {
    fn log_on_error(self, context: &str) -> Result<T>;
}

impl<T, E> LogOnError<T> for std::result::Result<T, E>
where
    E: Into<PatchError>,
{
    fn log_on_error(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            let error = e.into();
            match error.level() {
                ErrorLevel::Warning => log::warn!("{} in {}", error, context),
                ErrorLevel::Error => log::error!("{} in {}", error, context),
            }
            error
        })
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, PatchError>;

impl From<std::io::Error> for FileError {
    fn from(error: std::io::Error) -> Self {
        FileError::Io {
            message: error.to_string(),
        }
    }
}

impl From<std::io::Error> for PatchError {
    fn from(error: std::io::Error) -> Self {
        PatchError::File(error.into())
    }
}

impl From<serde_json::Error> for MalformedEditError {
    fn from(error: serde_json::Error) -> Self {
        MalformedEditError::Json {
            message: error.to_string(),
        }
    }
}
