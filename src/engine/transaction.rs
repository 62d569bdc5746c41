//! バッチ単位のトランザクション記録
//!
//! 状態遷移は `Pending → Validating → Applied | Aborted` のみ。
//! 遷移メソッドは `self` を消費するため、終端状態からは先に進めない。

use serde::Serialize;

/// バッチの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Pending,
    Validating,
    Applied,
    Aborted,
}

/// 一つの操作がバッファに与えた影響
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditEffect {
    pub deleted: usize,
    pub inserted: usize,
}

/// バッチ適用結果の要約
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub state: BatchState,
    pub lines_before: usize,
    pub lines_after: usize,
    /// 適用に成功した操作数
    pub applied: usize,
    pub deleted: usize,
    pub inserted: usize,
}

#[derive(Debug)]
pub struct BatchTransaction {
    state: BatchState,
    total: usize,
    lines_before: usize,
    applied: usize,
    deleted: usize,
    inserted: usize,
}

impl BatchTransaction {
    pub fn new(total: usize, lines_before: usize) -> Self {
        Self {
            state: BatchState::Pending,
            total,
            lines_before,
            applied: 0,
            deleted: 0,
            inserted: 0,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn begin_validation(mut self) -> Self {
        debug_assert_eq!(self.state, BatchState::Pending);
        self.state = BatchState::Validating;
        self
    }

    pub fn record(&mut self, effect: EditEffect) {
        debug_assert_eq!(self.state, BatchState::Validating);
        self.applied += 1;
        self.deleted += effect.deleted;
        self.inserted += effect.inserted;
    }

    pub fn commit(mut self, lines_after: usize) -> ApplyReport {
        debug_assert_eq!(self.state, BatchState::Validating);
        debug_assert_eq!(self.applied, self.total);
        self.state = BatchState::Applied;
        self.report(lines_after)
    }

    /// 中断。作業中のバッファは呼び出し側で破棄される
    pub fn abort(mut self) -> ApplyReport {
        self.state = BatchState::Aborted;
        self.report(self.lines_before)
    }

    fn report(&self, lines_after: usize) -> ApplyReport {
        ApplyReport {
            state: self.state,
            lines_before: self.lines_before,
            lines_after,
            applied: self.applied,
            deleted: self.deleted,
            inserted: self.inserted,
        }
    }
}
