//! バッチ適用エンジン
//!
//! 編集バッチを行番号の降順に一つずつ適用する。上の行はまだずれていないので、
//! 各操作が指定した変更前の行番号はその時点でも同じ行を指す。
//! 作業はバッファの複製に対して行い、全操作が成功した場合にのみ書き戻す。

pub mod overlap;
pub mod transaction;

pub use transaction::{ApplyReport, BatchState, BatchTransaction, EditEffect};

use crate::buffer::LineBuffer;
use crate::config::{EngineOptions, OverlapPolicy};
use crate::edit::{EditBatch, EditOperation};
use crate::error::{LogOnError, Result};
use crate::file::{DocumentStore, FileStore};
use std::path::Path;

/// パッチエンジン
#[derive(Debug, Clone, Default)]
pub struct PatchEngine {
    options: EngineOptions,
}

impl PatchEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// バッファの複製にバッチを適用して返す（永続化はしない）
    ///
    /// 失敗時は元のバッファに一切影響しない。
    pub fn apply(
        &self,
        document: &LineBuffer,
        batch: &EditBatch,
    ) -> Result<(LineBuffer, ApplyReport)> {
        let (working, tx) = self.apply_working(document, batch)?;
        let report = tx.commit(working.len());
        Ok((working, report))
    }

    /// ストア上のドキュメントにバッチを適用し、成功時のみ上書きする
    pub fn apply_to_store(
        &self,
        store: &dyn DocumentStore,
        batch: &EditBatch,
    ) -> Result<ApplyReport> {
        let target = store.describe();
        let document = LineBuffer::load_from(store).log_on_error(&target)?;
        let (working, tx) = self.apply_working(&document, batch).log_on_error(&target)?;

        if let Err(error) = store.write_document(&working.serialize()) {
            let report = tx.abort();
            log::error!(
                "write failed after {} edits were applied in memory: {}",
                report.applied,
                error
            );
            return Err(error);
        }

        let report = tx.commit(working.len());
        log::info!(
            "applied {} edits to {} ({} -> {} lines)",
            report.applied,
            target,
            report.lines_before,
            report.lines_after
        );
        Ok(report)
    }

    /// ファイルパスを指定して適用
    pub fn apply_to_path<P: AsRef<Path>>(&self, path: P, batch: &EditBatch) -> Result<ApplyReport> {
        let store = FileStore::new(path.as_ref()).with_write_mode(self.options.write_mode);
        self.apply_to_store(&store, batch)
    }

    /// 作業用バッファを作って全操作を適用する。トランザクションは Validating のまま返す
    fn apply_working(
        &self,
        document: &LineBuffer,
        batch: &EditBatch,
    ) -> Result<(LineBuffer, BatchTransaction)> {
        let mut tx = BatchTransaction::new(batch.len(), document.len()).begin_validation();

        if self.options.overlap_policy == OverlapPolicy::Reject {
            if let Err(error) = overlap::check(batch) {
                tx.abort();
                return Err(error);
            }
        }

        let mut working = document.clone();
        for (index, operation) in batch.ordered() {
            match apply_operation(&mut working, operation) {
                Ok(effect) => {
                    log::debug!("edit #{} ({}) applied", index, operation.kind());
                    tx.record(effect);
                }
                Err(error) => {
                    let report = tx.abort();
                    log::debug!(
                        "edit #{} aborted the batch after {} applied edits",
                        index,
                        report.applied
                    );
                    return Err(error);
                }
            }
        }

        Ok((working, tx))
    }
}

/// 単一操作を現在のバッファ長に対して検証し適用する
fn apply_operation(buffer: &mut LineBuffer, operation: &EditOperation) -> Result<EditEffect> {
    match operation {
        EditOperation::DeleteRange { start, end } => {
            let removed = buffer.delete_range(*start, *end)?;
            Ok(EditEffect {
                deleted: removed.len(),
                inserted: 0,
            })
        }
        EditOperation::InsertAfter { after, text } => {
            buffer.insert_after(*after, text.as_str())?;
            Ok(EditEffect {
                deleted: 0,
                inserted: 1,
            })
        }
        EditOperation::ReplaceLine { line, text } => {
            buffer.replace(*line, text.as_str())?;
            Ok(EditEffect::default())
        }
    }
}

/// 現在永続化されているドキュメントの番号付きビューを取得
pub fn fetch_numbered(store: &dyn DocumentStore) -> Result<String> {
    let document = LineBuffer::load_from(store)?;
    Ok(document.numbered().render())
}
