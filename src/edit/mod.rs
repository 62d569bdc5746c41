//! 編集モデル
//!
//! 編集操作の列挙型、適用順序キー、バッチのワイヤ形式を提供

pub mod batch;
pub mod operation;

pub use batch::EditBatch;
pub use operation::{EditKind, EditOperation, OrderKey};
