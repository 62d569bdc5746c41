// document_edit_tests.rs - ファイルに対するバッチ適用のテスト

use linepatch::{
    EditBatch, EditKind, EditOperation, EngineOptions, FileStore, LineBuffer, PatchEngine,
    PatchError, WriteMode,
};
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

const FIVE_LINES: &str = "Line 1\nLine 2\nLine 3\nLine 4\nLine 5\n";

fn five_line_file() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("document.txt");
    fs::write(&path, FIVE_LINES).unwrap();
    (dir, path)
}

fn apply(path: &PathBuf, operations: Vec<EditOperation>) -> linepatch::Result<()> {
    let batch = EditBatch::new(operations)?;
    PatchEngine::default().apply_to_path(path, &batch).map(|_| ())
}

fn read_lines(path: &PathBuf) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .split_inclusive('\n')
        .map(str::to_string)
        .collect()
}

#[test]
fn test_delete_single_line() {
    let (_dir, path) = five_line_file();
    apply(&path, vec![EditOperation::delete_range(1, 1)]).unwrap();
    assert_eq!(
        read_lines(&path),
        vec!["Line 2\n", "Line 3\n", "Line 4\n", "Line 5\n"]
    );
}

#[test]
fn test_delete_range_of_lines() {
    let (_dir, path) = five_line_file();
    apply(&path, vec![EditOperation::delete_range(1, 3)]).unwrap();
    assert_eq!(read_lines(&path), vec!["Line 4\n", "Line 5\n"]);
}

#[test]
fn test_add_line_in_middle() {
    let (_dir, path) = five_line_file();
    apply(&path, vec![EditOperation::insert_after(2, "New Line")]).unwrap();
    assert_eq!(
        read_lines(&path),
        vec!["Line 1\n", "Line 2\n", "New Line\n", "Line 3\n", "Line 4\n", "Line 5\n"]
    );
}

#[test]
fn test_add_line_at_end() {
    let (_dir, path) = five_line_file();
    apply(&path, vec![EditOperation::append("New Line at End")]).unwrap();
    assert_eq!(
        read_lines(&path),
        vec![
            "Line 1\n",
            "Line 2\n",
            "Line 3\n",
            "Line 4\n",
            "Line 5\n",
            "New Line at End\n"
        ]
    );
}

#[test]
fn test_edit_single_line() {
    let (_dir, path) = five_line_file();
    apply(&path, vec![EditOperation::replace_line(2, "Edited Line 2")]).unwrap();
    assert_eq!(
        read_lines(&path),
        vec!["Line 1\n", "Edited Line 2\n", "Line 3\n", "Line 4\n", "Line 5\n"]
    );
}

#[test]
fn test_combined_edits() {
    let (_dir, path) = five_line_file();
    apply(
        &path,
        vec![
            EditOperation::delete_range(1, 1),
            EditOperation::insert_after(2, "Inserted Line"),
            EditOperation::replace_line(3, "Edited Line 3"),
        ],
    )
    .unwrap();
    assert_eq!(
        read_lines(&path),
        vec![
            "Line 2\n",
            "Inserted Line\n",
            "Edited Line 3\n",
            "Line 4\n",
            "Line 5\n"
        ]
    );
}

#[test]
fn test_invalid_line_number_for_delete() {
    let (_dir, path) = five_line_file();
    let error = apply(&path, vec![EditOperation::delete_range(10, 10)]).unwrap_err();
    assert!(matches!(
        error,
        PatchError::OutOfRange {
            kind: EditKind::Delete,
            ..
        }
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), FIVE_LINES);
}

#[test]
fn test_invalid_line_number_for_add() {
    let (_dir, path) = five_line_file();
    let error = apply(&path, vec![EditOperation::insert_after(10, "Invalid Line\n")]).unwrap_err();
    assert!(matches!(
        error,
        PatchError::OutOfRange {
            kind: EditKind::Insert,
            ..
        }
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), FIVE_LINES);
}

#[test]
fn test_invalid_line_number_for_edit() {
    let (_dir, path) = five_line_file();
    let error = apply(&path, vec![EditOperation::replace_line(10, "Invalid Edit\n")]).unwrap_err();
    assert!(matches!(
        error,
        PatchError::OutOfRange {
            kind: EditKind::Replace,
            ..
        }
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), FIVE_LINES);
}

#[test]
fn test_failure_after_earlier_mutations_persists_nothing() {
    let (_dir, path) = five_line_file();
    // append と replace(5) は適用済みになった後、delete(0..=1) で中断される
    let error = apply(
        &path,
        vec![
            EditOperation::delete_range(0, 1),
            EditOperation::replace_line(5, "changed"),
            EditOperation::append("tail"),
        ],
    )
    .unwrap_err();
    assert!(matches!(error, PatchError::OutOfRange { start: 0, .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), FIVE_LINES);
}

#[test]
fn test_replace_is_idempotent_delete_is_not() {
    let (_dir, path) = five_line_file();
    let replace = EditBatch::new(vec![EditOperation::replace_line(3, "Same")]).unwrap();
    let engine = PatchEngine::default();

    engine.apply_to_path(&path, &replace).unwrap();
    let once = fs::read_to_string(&path).unwrap();
    engine.apply_to_path(&path, &replace).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), once);

    let delete = EditBatch::new(vec![EditOperation::delete_range(4, 5)]).unwrap();
    engine.apply_to_path(&path, &delete).unwrap();
    let after_delete = fs::read_to_string(&path).unwrap();
    assert!(engine.apply_to_path(&path, &delete).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), after_delete);
}

#[test]
fn test_json_batch_against_file_with_direct_write() {
    let (_dir, path) = five_line_file();
    let batch = EditBatch::from_json(
        r#"{"edits": [
            {"edit_type": "delete", "line_numbers": [1, 1]},
            {"edit_type": "add", "line_number": 2, "new_line": "Inserted Line"},
            {"edit_type": "edit", "line_number": 3, "new_line": "Edited Line 3"},
            {"edit_type": "add", "line_number": null, "new_line": "The End"}
        ]}"#,
    )
    .unwrap();
    let engine = PatchEngine::new(EngineOptions {
        write_mode: WriteMode::Direct,
        ..EngineOptions::default()
    });

    let report = engine.apply_to_path(&path, &batch).unwrap();
    assert_eq!(report.lines_before, 5);
    assert_eq!(report.lines_after, 6);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Line 2\nInserted Line\nEdited Line 3\nLine 4\nLine 5\nThe End\n"
    );
}

#[test]
fn test_numbered_view_after_batch() {
    let (_dir, path) = five_line_file();
    apply(&path, vec![EditOperation::delete_range(2, 4)]).unwrap();
    let view = linepatch::fetch_numbered(&FileStore::new(&path)).unwrap();
    assert_eq!(view, "\n1: Line 1\n2: Line 5");
    assert_eq!(
        LineBuffer::load(&path).unwrap().numbered().render(),
        view
    );
}

#[test]
fn test_missing_file_is_file_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    let error = apply(&path, vec![EditOperation::append("x")]).unwrap_err();
    assert!(matches!(error, PatchError::File(_)));
    assert!(!path.exists());
}
