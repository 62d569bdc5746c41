//! エンジン設定
//!
//! 設定は三層で解決する：設定ファイル < 環境変数 < コマンドライン。
//! 各層は `OptionOverrides` として読み込み、`merged_with` で重ねる。

use crate::error::ConfigError;
use crate::logging::LogLevel;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 重なり合う編集の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// 検出せず降順適用にそのまま任せる（結果は未規定）
    #[default]
    Allow,
    /// 変更前にバッチ全体を拒否
    Reject,
}

impl FromStr for OverlapPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(OverlapPolicy::Allow),
            "reject" => Ok(OverlapPolicy::Reject),
            _ => Err(ConfigError::InvalidValue {
                key: "overlap_policy".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// ドキュメントの書き戻し方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// 一時ファイルに書いてからリネーム
    #[default]
    Atomic,
    /// 対象ファイルへ一回の書き込み
    Direct,
}

impl FromStr for WriteMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(WriteMode::Atomic),
            "direct" => Ok(WriteMode::Direct),
            _ => Err(ConfigError::InvalidValue {
                key: "write_mode".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// 解決済みのエンジン設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub overlap_policy: OverlapPolicy,
    pub write_mode: WriteMode,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::Allow,
            write_mode: WriteMode::Atomic,
            log_level: LogLevel::Warning,
            log_file: None,
        }
    }
}

/// 設定の一層分（未指定は `None`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionOverrides {
    pub overlap_policy: Option<OverlapPolicy>,
    pub write_mode: Option<WriteMode>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
}

pub const ENV_OVERLAP: &str = "LINEPATCH_OVERLAP";
pub const ENV_WRITE_MODE: &str = "LINEPATCH_WRITE_MODE";
pub const ENV_LOG: &str = "LINEPATCH_LOG";
pub const ENV_LOG_FILE: &str = "LINEPATCH_LOG_FILE";

impl OptionOverrides {
    /// プロセスの環境変数から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// 任意の変数列から読み込む
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = Self::default();
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                ENV_OVERLAP => overrides.overlap_policy = Some(value.parse()?),
                ENV_WRITE_MODE => overrides.write_mode = Some(value.parse()?),
                ENV_LOG => overrides.log_level = Some(value.parse()?),
                ENV_LOG_FILE if !value.is_empty() => {
                    overrides.log_file = Some(PathBuf::from(value))
                }
                _ => {}
            }
        }
        Ok(overrides)
    }

    /// JSON 設定ファイルから読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let invalid = |message: String| ConfigError::InvalidFile {
            path: path.display().to_string(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))
    }

    /// 既定の設定ファイルが存在すれば読み込む
    pub fn from_default_file() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// `overrides` 側を優先して重ねる
    pub fn merged_with(&self, overrides: &OptionOverrides) -> OptionOverrides {
        OptionOverrides {
            overlap_policy: overrides.overlap_policy.or(self.overlap_policy),
            write_mode: overrides.write_mode.or(self.write_mode),
            log_level: overrides.log_level.or(self.log_level),
            log_file: overrides
                .log_file
                .clone()
                .or_else(|| self.log_file.clone()),
        }
    }

    /// 未指定項目を既定値で埋める
    pub fn resolve(self) -> EngineOptions {
        let defaults = EngineOptions::default();
        EngineOptions {
            overlap_policy: self.overlap_policy.unwrap_or(defaults.overlap_policy),
            write_mode: self.write_mode.unwrap_or(defaults.write_mode),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            log_file: self.log_file.or(defaults.log_file),
        }
    }
}

/// 既定の設定ファイルパス（`~/.linepatch/config.json`）
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".linepatch").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let options = OptionOverrides::default().resolve();
        assert_eq!(options, EngineOptions::default());
        assert_eq!(options.overlap_policy, OverlapPolicy::Allow);
        assert_eq!(options.write_mode, WriteMode::Atomic);
    }

    #[test]
    fn test_from_vars() {
        let overrides = OptionOverrides::from_vars([
            (ENV_OVERLAP, "reject"),
            (ENV_WRITE_MODE, "Direct"),
            (ENV_LOG, "debug"),
            ("UNRELATED", "whatever"),
        ])
        .unwrap();
        assert_eq!(overrides.overlap_policy, Some(OverlapPolicy::Reject));
        assert_eq!(overrides.write_mode, Some(WriteMode::Direct));
        assert_eq!(overrides.log_level, Some(LogLevel::Debug));
        assert_eq!(overrides.log_file, None);
    }

    #[test]
    fn test_invalid_env_value() {
        let error = OptionOverrides::from_vars([(ENV_OVERLAP, "merge")]).unwrap_err();
        assert_eq!(
            error,
            ConfigError::InvalidValue {
                key: "overlap_policy".to_string(),
                value: "merge".to_string()
            }
        );
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = OptionOverrides {
            overlap_policy: Some(OverlapPolicy::Reject),
            write_mode: Some(WriteMode::Direct),
            log_level: None,
            log_file: Some(PathBuf::from("base.log")),
        };
        let top = OptionOverrides {
            write_mode: Some(WriteMode::Atomic),
            log_level: Some(LogLevel::Info),
            ..OptionOverrides::default()
        };
        let merged = base.merged_with(&top).resolve();
        assert_eq!(merged.overlap_policy, OverlapPolicy::Reject);
        assert_eq!(merged.write_mode, WriteMode::Atomic);
        assert_eq!(merged.log_level, LogLevel::Info);
        assert_eq!(merged.log_file, Some(PathBuf::from("base.log")));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"overlap_policy": "reject", "log_level": "warning"}"#).unwrap();

        let overrides = OptionOverrides::from_file(&path).unwrap();
        assert_eq!(overrides.overlap_policy, Some(OverlapPolicy::Reject));
        assert_eq!(overrides.log_level, Some(LogLevel::Warning));
        assert_eq!(overrides.write_mode, None);
    }

    #[test]
    fn test_from_file_accepts_short_level_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_level": "warn"}"#).unwrap();

        let from_file = OptionOverrides::from_file(&path).unwrap();
        let from_env = OptionOverrides::from_vars([(ENV_LOG, "warn")]).unwrap();
        assert_eq!(from_file.log_level, Some(LogLevel::Warning));
        assert_eq!(from_file.log_level, from_env.log_level);
    }

    #[test]
    fn test_from_file_rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"overlap": "reject"}"#).unwrap();

        assert!(matches!(
            OptionOverrides::from_file(&path),
            Err(ConfigError::InvalidFile { .. })
        ));
    }
}
