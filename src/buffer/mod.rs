//! バッファ管理モジュール
//!
//! 行バッファと、その番号付きビューを提供

pub mod line_buffer;
pub mod numbered_view;

// 公開API
pub use line_buffer::LineBuffer;
pub use numbered_view::{NumberedEntries, NumberedView};
