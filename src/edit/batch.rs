//! 編集バッチとワイヤ形式
//!
//! 外部の生成側から受け取る `{"edits": [...]}` 形式の JSON を解析し、
//! 構造検証済みの `EditBatch` を組み立てる。

use super::operation::EditOperation;
use crate::error::MalformedEditError;
use serde::{Deserialize, Serialize};

/// ワイヤ形式の単一編集
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "edit_type", rename_all = "lowercase")]
enum WireEdit {
    Delete {
        line_numbers: (i64, i64),
    },
    Add {
        // null は許可するがフィールド自体の省略は許可しない
        #[serde(deserialize_with = "Option::deserialize")]
        line_number: Option<i64>,
        new_line: String,
    },
    Edit {
        line_number: i64,
        new_line: String,
    },
}

impl From<WireEdit> for EditOperation {
    fn from(edit: WireEdit) -> Self {
        match edit {
            WireEdit::Delete {
                line_numbers: (start, end),
            } => EditOperation::DeleteRange { start, end },
            WireEdit::Add {
                line_number,
                new_line,
            } => EditOperation::InsertAfter {
                after: line_number,
                text: new_line,
            },
            WireEdit::Edit {
                line_number,
                new_line,
            } => EditOperation::ReplaceLine {
                line: line_number,
                text: new_line,
            },
        }
    }
}

impl From<&EditOperation> for WireEdit {
    fn from(operation: &EditOperation) -> Self {
        match operation {
            EditOperation::DeleteRange { start, end } => WireEdit::Delete {
                line_numbers: (*start, *end),
            },
            EditOperation::InsertAfter { after, text } => WireEdit::Add {
                line_number: *after,
                new_line: text.clone(),
            },
            EditOperation::ReplaceLine { line, text } => WireEdit::Edit {
                line_number: *line,
                new_line: text.clone(),
            },
        }
    }
}

#[derive(Deserialize)]
struct WireBatchIn {
    edits: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct WireBatchOut {
    edits: Vec<WireEdit>,
}

/// 構造検証済みの編集バッチ
///
/// 要素の順序は提出順のまま保持し、適用順は `ordered` が決める。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBatch {
    operations: Vec<EditOperation>,
}

impl EditBatch {
    /// 生成側へ提示するバッチの記述例
    pub const EXAMPLE_JSON: &'static str = r#"{
    "edits": [
        {
            "edit_type": "delete",
            "line_numbers": [5, 7]
        },
        {
            "edit_type": "add",
            "line_number": 5,
            "new_line": "This line goes right below line 5."
        },
        {
            "edit_type": "add",
            "line_number": null,
            "new_line": "This line goes at the end of the document."
        },
        {
            "edit_type": "edit",
            "line_number": 9,
            "new_line": "This replaces the content of line 9."
        }
    ]
}"#;

    /// 操作列からバッチを構築（構造検証付き）
    pub fn new(mut operations: Vec<EditOperation>) -> Result<Self, MalformedEditError> {
        for (index, operation) in operations.iter_mut().enumerate() {
            operation.strip_trailing_terminator();
            operation.validate(index)?;
        }
        Ok(Self { operations })
    }

    /// JSON 文字列からバッチを解析
    pub fn from_json(input: &str) -> Result<Self, MalformedEditError> {
        let wire: WireBatchIn = serde_json::from_str(input)?;
        let operations = wire
            .edits
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<WireEdit>(value)
                    .map(EditOperation::from)
                    .map_err(|e| MalformedEditError::Shape {
                        index,
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(operations)
    }

    /// ワイヤ形式の JSON へ変換
    pub fn to_json(&self) -> Result<String, MalformedEditError> {
        let wire = WireBatchOut {
            edits: self.operations.iter().map(WireEdit::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&wire)?)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// 提出順の操作列
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    /// 適用順（キー降順）に並べた `(提出位置, 操作)` の列
    ///
    /// 同じキーを持つ操作は提出順を保つ（安定ソート）。
    pub fn ordered(&self) -> Vec<(usize, &EditOperation)> {
        let mut ordered: Vec<(usize, &EditOperation)> =
            self.operations.iter().enumerate().collect();
        ordered.sort_by(|a, b| b.1.order_key().cmp(&a.1.order_key()));
        ordered
    }
}
