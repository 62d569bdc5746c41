//! 編集操作の定義
//!
//! 行番号で指定される三種類の編集操作を閉じた列挙型として表現する。

use crate::error::MalformedEditError;
use std::fmt;

/// 編集操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    Delete,
    Insert,
    Replace,
}

impl EditKind {
    /// ワイヤ形式での識別子
    pub fn wire_name(self) -> &'static str {
        match self {
            EditKind::Delete => "delete",
            EditKind::Insert => "add",
            EditKind::Replace => "edit",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// 単一の編集操作
///
/// 行番号はすべて 1 始まり。範囲外の値（0 や負数）も構造上は受け付け、
/// 適用時にバッファ長と照合して弾く。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    /// `start..=end` の行を削除
    DeleteRange { start: i64, end: i64 },
    /// `after` 行の直後に挿入（`None` は末尾に追加）
    InsertAfter { after: Option<i64>, text: String },
    /// `line` 行の内容を置換
    ReplaceLine { line: i64, text: String },
}

/// 適用順序を決めるキー
///
/// `End` はどの行番号よりも大きい。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderKey {
    Line(i64),
    End,
}

impl EditOperation {
    pub fn delete_range(start: i64, end: i64) -> Self {
        EditOperation::DeleteRange { start, end }
    }

    pub fn delete_line(line: i64) -> Self {
        EditOperation::DeleteRange {
            start: line,
            end: line,
        }
    }

    pub fn insert_after(after: i64, text: impl Into<String>) -> Self {
        EditOperation::InsertAfter {
            after: Some(after),
            text: text.into(),
        }
    }

    pub fn append(text: impl Into<String>) -> Self {
        EditOperation::InsertAfter {
            after: None,
            text: text.into(),
        }
    }

    pub fn replace_line(line: i64, text: impl Into<String>) -> Self {
        EditOperation::ReplaceLine {
            line,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> EditKind {
        match self {
            EditOperation::DeleteRange { .. } => EditKind::Delete,
            EditOperation::InsertAfter { .. } => EditKind::Insert,
            EditOperation::ReplaceLine { .. } => EditKind::Replace,
        }
    }

    pub fn order_key(&self) -> OrderKey {
        match self {
            EditOperation::DeleteRange { start, .. } => OrderKey::Line(*start),
            EditOperation::InsertAfter { after: Some(line), .. } => OrderKey::Line(*line),
            EditOperation::InsertAfter { after: None, .. } => OrderKey::End,
            EditOperation::ReplaceLine { line, .. } => OrderKey::Line(*line),
        }
    }

    /// 新しい行の末尾に付いた改行を一つだけ取り除く
    pub fn strip_trailing_terminator(&mut self) {
        if let EditOperation::InsertAfter { text, .. } | EditOperation::ReplaceLine { text, .. } =
            self
        {
            if text.ends_with('\n') {
                text.pop();
                if text.ends_with('\r') {
                    text.pop();
                }
            }
        }
    }

    /// 構造検証（ドキュメント長は参照しない）
    ///
    /// `index` はバッチ内の位置で、エラー報告にのみ使う。
    pub fn validate(&self, index: usize) -> Result<(), MalformedEditError> {
        match self {
            EditOperation::DeleteRange { start, end } if start > end => {
                Err(MalformedEditError::InvertedRange {
                    index,
                    start: *start,
                    end: *end,
                })
            }
            EditOperation::InsertAfter { text, .. } | EditOperation::ReplaceLine { text, .. }
                if text.contains(|c: char| c == '\n' || c == '\r') =>
            {
                Err(MalformedEditError::Shape {
                    index,
                    message: "new_line must be a single line".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
