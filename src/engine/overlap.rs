//! 重なり合う編集の検出
//!
//! 降順適用は互いに重ならない操作に対してのみ意図どおりに働く。
//! `OverlapPolicy::Reject` の場合はここで変更前にバッチを拒否する。
//! 判定はすべて変更前ドキュメントの行番号に対して行う。

use crate::edit::{EditBatch, EditOperation};
use crate::error::{PatchError, Result};

/// 最初に見つかった衝突を報告する
pub fn check(batch: &EditBatch) -> Result<()> {
    let operations = batch.operations();
    for (first, a) in operations.iter().enumerate() {
        for (offset, b) in operations[first + 1..].iter().enumerate() {
            if conflicts(a, b) {
                return Err(PatchError::Overlap {
                    first,
                    second: first + 1 + offset,
                });
            }
        }
    }
    Ok(())
}

fn conflicts(a: &EditOperation, b: &EditOperation) -> bool {
    use EditOperation::*;

    match (a, b) {
        (
            DeleteRange {
                start: s1,
                end: e1,
            },
            DeleteRange {
                start: s2,
                end: e2,
            },
        ) => s1 <= e2 && s2 <= e1,
        (DeleteRange { start, end }, ReplaceLine { line, .. })
        | (ReplaceLine { line, .. }, DeleteRange { start, end }) => start <= line && line <= end,
        (
            DeleteRange { start, end },
            InsertAfter {
                after: Some(line), ..
            },
        )
        | (
            InsertAfter {
                after: Some(line), ..
            },
            DeleteRange { start, end },
        ) => start <= line && line <= end,
        (ReplaceLine { line: l1, .. }, ReplaceLine { line: l2, .. }) => l1 == l2,
        _ => false,
    }
}
