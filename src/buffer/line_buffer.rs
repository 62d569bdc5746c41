//! 行バッファ
//!
//! ドキュメントを行の列として保持する。外部からのアドレスはすべて 1 始まり。

use super::numbered_view::NumberedView;
use crate::edit::EditKind;
use crate::error::{PatchError, Result};
use crate::file::{DocumentStore, FileStore};
use std::path::Path;

/// 行単位の可変バッファ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    /// 空のバッファを作成
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// 行の列から作成
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// テキストを改行で分割して作成（改行文字は保持しない）
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// ストアからドキュメントを読み込む
    pub fn load_from(store: &dyn DocumentStore) -> Result<Self> {
        let content = store.read_document()?;
        Ok(Self::from_text(&content))
    }

    /// ファイルからドキュメントを読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_from(&FileStore::new(path.as_ref()))
    }

    /// 永続化形式へ変換（最終行を含む全行に改行を付ける）
    pub fn serialize(&self) -> String {
        let capacity = self.lines.iter().map(|line| line.len() + 1).sum();
        let mut out = String::with_capacity(capacity);
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// `line` 行目を取得
    pub fn get(&self, line: i64) -> Option<&str> {
        self.index_of(line).map(|idx| self.lines[idx].as_str())
    }

    /// 番号付きビュー
    pub fn numbered(&self) -> NumberedView<'_> {
        NumberedView::new(&self.lines)
    }

    /// `start..=end` の行を削除し、削除した行を返す
    ///
    /// 範囲が `[1, len]` に収まらない場合は何も変更しない。
    pub fn delete_range(&mut self, start: i64, end: i64) -> Result<Vec<String>> {
        if start < 1 || end > self.len_i64() || start > end {
            return Err(self.out_of_range(EditKind::Delete, start, end));
        }
        let from = (start - 1) as usize;
        let to = end as usize;
        Ok(self.lines.drain(from..to).collect())
    }

    /// `after` 行の直後に挿入。`None` は末尾に追加
    pub fn insert_after(&mut self, after: Option<i64>, text: impl Into<String>) -> Result<()> {
        match after {
            None => self.lines.push(text.into()),
            Some(line) => {
                if line <= 0 || line > self.len_i64() {
                    return Err(self.out_of_range(EditKind::Insert, line, line));
                }
                self.lines.insert(line as usize, text.into());
            }
        }
        Ok(())
    }

    /// `line` 行の内容を置換し、以前の内容を返す
    pub fn replace(&mut self, line: i64, text: impl Into<String>) -> Result<String> {
        let idx = self
            .index_of(line)
            .ok_or_else(|| self.out_of_range(EditKind::Replace, line, line))?;
        Ok(std::mem::replace(&mut self.lines[idx], text.into()))
    }

    fn len_i64(&self) -> i64 {
        self.lines.len() as i64
    }

    fn index_of(&self, line: i64) -> Option<usize> {
        if line >= 1 && line <= self.len_i64() {
            Some((line - 1) as usize)
        } else {
            None
        }
    }

    fn out_of_range(&self, kind: EditKind, start: i64, end: i64) -> PatchError {
        PatchError::OutOfRange {
            kind,
            start,
            end,
            current_len: self.lines.len(),
        }
    }
}
