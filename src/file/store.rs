//! ドキュメントの読み書き
//!
//! エンジンから見たファイルアクセスは `DocumentStore` を経由する単純な
//! 読み込み・書き込みのみ。

use crate::config::WriteMode;
use crate::error::{FileError, Result};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

/// ドキュメントの永続化先
pub trait DocumentStore {
    /// ログ用の識別名
    fn describe(&self) -> String;

    /// ドキュメント全体を読み込む
    fn read_document(&self) -> Result<String>;

    /// ドキュメント全体を上書きする
    fn write_document(&self, content: &str) -> Result<()>;
}

/// ファイルシステム上のドキュメント
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    write_mode: WriteMode,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// アトミック保存（一時ファイル経由）
    fn atomic_write(&self, content: &str) -> Result<()> {
        let temp_path = temp_path_for(&self.path)?;
        log::debug!("atomic write via {}", temp_path.display());
        replace_via_temp(&temp_path, &self.path, |temp| {
            std::fs::write(temp, content.as_bytes())
        })
    }

    fn direct_write(&self, content: &str) -> Result<()> {
        std::fs::write(&self.path, content.as_bytes())
            .map_err(|e| FileError::from_io(e, &self.path))?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_document(&self) -> Result<String> {
        if !self.path.exists() {
            return Err(FileError::NotFound {
                path: self.describe(),
            }
            .into());
        }
        if self.path.is_dir() {
            return Err(FileError::InvalidPath {
                path: self.describe(),
            }
            .into());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| FileError::from_io(e, &self.path))?;
        Ok(content)
    }

    fn write_document(&self, content: &str) -> Result<()> {
        match self.write_mode {
            WriteMode::Atomic => self.atomic_write(content),
            WriteMode::Direct => self.direct_write(content),
        }
    }
}

/// 一時ファイルへ書いてから置き換える。失敗時は一時ファイルを残さない
fn replace_via_temp<F>(temp_path: &Path, target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    if let Err(e) = write(temp_path) {
        let _ = std::fs::remove_file(temp_path);
        return Err(FileError::from_io(e, temp_path).into());
    }
    if let Err(e) = std::fs::rename(temp_path, target) {
        let _ = std::fs::remove_file(temp_path);
        return Err(FileError::from_io(e, target).into());
    }
    Ok(())
}

fn temp_path_for(original: &Path) -> Result<PathBuf> {
    let invalid = || FileError::InvalidPath {
        path: original.display().to_string(),
    };
    let filename = original.file_name().ok_or_else(invalid)?;
    let parent = match original.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => return Err(invalid().into()),
    };

    let temp_name = format!(".{}_{}.tmp", filename.to_string_lossy(), std::process::id());
    Ok(parent.join(temp_name))
}

/// メモリ上のドキュメント
///
/// テストや、ファイルを介さない呼び出し側向け。
#[derive(Debug, Default)]
pub struct MemoryStore {
    content: RefCell<Option<String>>,
    writes: Cell<usize>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: RefCell::new(Some(content.into())),
            writes: Cell::new(0),
            fail_writes: false,
        }
    }

    /// 読み込み時に NotFound を返す空のストア
    pub fn missing() -> Self {
        Self::default()
    }

    /// 書き込みを常に失敗させる
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn content(&self) -> Option<String> {
        self.content.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl DocumentStore for MemoryStore {
    fn describe(&self) -> String {
        "<memory>".to_string()
    }

    fn read_document(&self) -> Result<String> {
        self.content.borrow().clone().ok_or_else(|| {
            FileError::NotFound {
                path: self.describe(),
            }
            .into()
        })
    }

    fn write_document(&self, content: &str) -> Result<()> {
        if self.fail_writes {
            return Err(FileError::Io {
                message: "write rejected by store".to_string(),
            }
            .into());
        }
        self.writes.set(self.writes.get() + 1);
        *self.content.borrow_mut() = Some(content.to_string());
        Ok(())
    }
}
