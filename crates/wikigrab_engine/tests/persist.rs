use std::fs;

use tempfile::TempDir;
use wikigrab_engine::{ensure_output_dir, write_new_file, AtomicFileWriter, PersistError};

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("images").join("nested");
    assert!(!new_dir.exists());

    assert!(ensure_output_dir(&new_dir).unwrap());
    assert!(new_dir.is_dir());
    assert!(!ensure_output_dir(&new_dir).unwrap());
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("images");
    fs::write(&file_path, "x").unwrap();

    let err = ensure_output_dir(&file_path).unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
}

#[test]
fn new_files_never_replace_existing_ones() {
    let temp = TempDir::new().unwrap();

    let path = write_new_file(temp.path(), "cat.png", b"first").unwrap();
    assert_eq!(path, temp.path().join("cat.png"));

    let err = write_new_file(temp.path(), "cat.png", b"second").unwrap_err();
    assert!(matches!(err, PersistError::AlreadyExists(ref p) if *p == path));
    assert_eq!(fs::read(&path).unwrap(), b"first");

    // Only the saved file remains; the rejected temp file is cleaned up.
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn atomic_write_replaces_existing_settings() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("settings.toml", "a = 1\n").unwrap();
    assert_eq!(first.file_name().unwrap(), "settings.toml");
    assert_eq!(fs::read_to_string(&first).unwrap(), "a = 1\n");

    let second = writer.write("settings.toml", "a = 2\n").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "a = 2\n");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("settings.toml", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("settings.toml").exists());
}
