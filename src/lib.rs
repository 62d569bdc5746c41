//! linepatch - 行指向ドキュメントパッチエンジン
//!
//! 行番号で指定された編集（削除・挿入・置換）のバッチを、
//! 全成功か全失敗かのどちらかでドキュメントに適用する。

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod buffer;
pub mod file;

// 編集層
pub mod edit;
pub mod engine;

// 公開API
pub use buffer::{LineBuffer, NumberedView};
pub use config::{EngineOptions, OptionOverrides, OverlapPolicy, WriteMode};
pub use edit::{EditBatch, EditKind, EditOperation};
pub use engine::{fetch_numbered, ApplyReport, BatchState, PatchEngine};
pub use error::{PatchError, Result};
pub use file::{DocumentStore, FileStore, MemoryStore};
