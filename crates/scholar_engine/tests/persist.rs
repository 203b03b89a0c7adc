use std::fs;

use scholar_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn nested_output_dir_is_created() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("exports").join("2024");
    ensure_output_dir(&dir).unwrap();
    assert!(dir.is_dir());
    // Second call is a no-op.
    ensure_output_dir(&dir).unwrap();
}

#[test]
fn saving_twice_overwrites_and_leaves_no_partial_files() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let path = writer.write("scholar_results.xlsx", b"PK\x03\x04old").unwrap();
    assert_eq!(path, temp.path().join("scholar_results.xlsx"));
    writer.write("scholar_results.xlsx", b"PK\x03\x04new").unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"PK\x03\x04new");

    let names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["scholar_results.xlsx".to_string()]);
}

#[test]
fn file_in_place_of_output_dir_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("results");
    fs::write(&blocker, "x").unwrap();

    let err = AtomicFileWriter::new(blocker.clone())
        .write("scholar_results.xlsx", b"data")
        .unwrap_err();
    assert!(matches!(err, PersistError::NotADirectory(path) if path == blocker));
}
