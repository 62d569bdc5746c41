//! 番号付きビュー
//!
//! 外部の生成側が次の編集で参照する行番号を知るための唯一の手段。
//! 各行は `"\n{番号}: {内容}"` の形で、番号の昇順に遅延生成される。

use std::fmt;
use std::iter::Enumerate;
use std::slice::Iter;

/// 行バッファの番号付き表示
#[derive(Debug, Clone, Copy)]
pub struct NumberedView<'a> {
    lines: &'a [String],
}

impl<'a> NumberedView<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self { lines }
    }

    /// エントリを遅延生成するイテレータ
    pub fn entries(&self) -> NumberedEntries<'a> {
        NumberedEntries {
            inner: self.lines.iter().enumerate(),
        }
    }

    /// 全エントリを連結した文字列
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NumberedView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, line) in self.lines.iter().enumerate() {
            write!(f, "\n{}: {}", idx + 1, line)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for NumberedView<'a> {
    type Item = String;
    type IntoIter = NumberedEntries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

/// `NumberedView` のエントリイテレータ
#[derive(Debug, Clone)]
pub struct NumberedEntries<'a> {
    inner: Enumerate<Iter<'a, String>>,
}

impl Iterator for NumberedEntries<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(idx, line)| format!("\n{}: {}", idx + 1, line))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for NumberedEntries<'_> {}
