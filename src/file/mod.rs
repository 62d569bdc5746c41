//! ファイル操作モジュール
//!
//! - ドキュメントは常に全体を読み込み、全体を書き戻す
//! - 既定はアトミック保存（一時ファイル＋リネーム）
//! - 同一ドキュメントへの同時書き込みは調停しない

pub mod store;

pub use store::{DocumentStore, FileStore, MemoryStore};
