#![allow(clippy::unwrap_used, clippy::non_ascii_literal)]
//! Integration tests for `capsule_validator::validate_path`.

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use capsule_validator::{
    Category, ErrorCategory, ErrorKind, ValidationConfig, open_source, validate_path,
};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const TAGS: &str = "one,two,three,four,five";

/// Manifest lines and file names for a capsule that meets every requirement.
fn complete_capsule() -> (String, Vec<String>) {
    let mut manifest = String::from("# Time capsule 2024\n\n");
    let mut files = Vec::new();
    let mut add = |name: String, label: &str| {
        writeln!(
            manifest,
            "{name} | {label} | Title {name} | Description | 2024-05-01 | {TAGS}"
        )
        .unwrap();
        files.push(name);
    };
    for i in 0..5 {
        add(format!("news{i}.txt"), "НОВОСТИ");
        add(format!("clip{i}.mp4"), "МЕДИА");
    }
    add("me.jpg".to_owned(), "ЛИЧНОЕ");
    add("family.jpg".to_owned(), "личное");
    (manifest, files)
}

fn write_zip(path: &Path, prefix: &str, manifest: &str, files: &[String]) {
    let file = fs::File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    writer
        .start_file(format!("{prefix}manifest.txt"), options)
        .unwrap();
    writer.write_all(manifest.as_bytes()).unwrap();
    for name in files {
        writer.start_file(format!("{prefix}{name}"), options).unwrap();
        writer.write_all(b"content").unwrap();
    }
    writer.finish().unwrap();
}

fn write_dir(root: &Path, manifest: &str, files: &[String]) {
    fs::write(root.join("manifest.txt"), manifest).unwrap();
    for name in files {
        fs::write(root.join(name), b"content").unwrap();
    }
}

fn zip_capsule(tmp: &TempDir, manifest: &str, files: &[String]) -> PathBuf {
    let path = tmp.path().join("capsule.zip");
    write_zip(&path, "", manifest, files);
    path
}

#[test]
fn test_validate_path_nonexistent_errors() {
    let tmp = TempDir::new().unwrap();
    let result = validate_path(&tmp.path().join("missing.zip"), &ValidationConfig::default());
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains("does not exist"), "got: {msg}");
}

#[test]
fn test_validate_path_unsupported_file_errors() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("capsule.tar");
    fs::write(&path, b"tar").unwrap();
    let msg = validate_path(&path, &ValidationConfig::default())
        .unwrap_err()
        .to_string();
    assert!(msg.contains("Unsupported capsule source"), "got: {msg}");
}

#[test]
fn test_validate_complete_zip() {
    let tmp = TempDir::new().unwrap();
    let (manifest, files) = complete_capsule();
    let path = zip_capsule(&tmp, &manifest, &files);

    let report = validate_path(&path, &ValidationConfig::default()).unwrap();

    assert!(report.ok, "unexpected errors: {:?}", report.errors);
    assert_eq!(report.items.len(), 12);
    assert_eq!(report.archive_files, 12);
    assert_eq!(report.manifest_path.as_deref(), Some("manifest.txt"));
    assert!(report.requirements.is_valid);
    assert_eq!(report.requirements.personal_count, 2);
    assert_eq!(report.items[0].category, Category::News);
    assert_eq!(report.items[0].line_number, 3);
}

#[test]
fn test_validate_nested_zip() {
    let tmp = TempDir::new().unwrap();
    let (manifest, files) = complete_capsule();
    let path = tmp.path().join("nested.ZIP");
    write_zip(&path, "capsule/", &manifest, &files);

    let report = validate_path(&path, &ValidationConfig::default()).unwrap();
    assert!(report.ok, "unexpected errors: {:?}", report.errors);
    assert_eq!(report.manifest_path.as_deref(), Some("capsule/manifest.txt"));
}

#[test]
fn test_validate_directory() {
    let tmp = TempDir::new().unwrap();
    let (manifest, files) = complete_capsule();
    write_dir(tmp.path(), &manifest, &files);

    let report = validate_path(tmp.path(), &ValidationConfig::default()).unwrap();
    assert!(report.ok, "unexpected errors: {:?}", report.errors);
    assert_eq!(report.items.len(), 12);
}

#[test]
fn test_missing_file_is_critical() {
    let tmp = TempDir::new().unwrap();
    let (manifest, mut files) = complete_capsule();
    files.retain(|f| f != "me.jpg");
    let path = zip_capsule(&tmp, &manifest, &files);

    let report = validate_path(&path, &ValidationConfig::default()).unwrap();
    assert!(!report.ok);
    assert_eq!(report.items.len(), 12, "items are still rendered");
    assert_eq!(report.errors.len(), 1);
    let err = &report.errors[0];
    assert_eq!(err.kind, ErrorKind::MissingFile);
    assert_eq!(err.category(), ErrorCategory::Critical);
    assert!(err.error.contains("me.jpg"));
    assert_eq!(err.line_number, 13);
}

#[test]
fn test_file_lookup_is_case_sensitive() {
    let tmp = TempDir::new().unwrap();
    let manifest = format!("Photo.JPG | ФОТО | T | D | 2024-01-01 | {TAGS}\n");
    let path = zip_capsule(&tmp, &manifest, &["photo.jpg".to_owned()]);

    let index = open_source(&path, &ValidationConfig::default()).unwrap();
    assert!(!index.contains("Photo.JPG"));
    assert_eq!(index.find_ignore_case("Photo.JPG"), Some("photo.jpg"));

    let report = validate_path(&path, &ValidationConfig::default()).unwrap();
    assert_eq!(report.errors_in(ErrorCategory::Critical).count(), 1);
}

#[test]
fn test_line_errors_and_requirements() {
    let tmp = TempDir::new().unwrap();
    let mut manifest = String::new();
    for i in 0..4 {
        writeln!(manifest, "n{i}.txt | НОВОСТИ | T | D | 2024-01-01 | {TAGS}").unwrap();
    }
    manifest.push_str("bad|line|here|now\n");
    manifest.push_str("x.jpg | ЧТОТО | T | 2024-01-01\n");
    manifest.push_str("short.jpg | ФОТО | T | 2024/01/01\n");
    let files: Vec<String> = (0..4)
        .map(|i| format!("n{i}.txt"))
        .chain(["short.jpg".to_owned()])
        .collect();
    let path = zip_capsule(&tmp, &manifest, &files);

    let report = validate_path(&path, &ValidationConfig::default()).unwrap();

    assert_eq!(report.items.len(), 5);
    let kinds: Vec<_> = report.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        [
            ErrorKind::MalformedDelimiter,
            ErrorKind::InvalidType,
            ErrorKind::InsufficientTags,
        ]
    );
    assert_eq!(report.errors_count(), 1);
    assert_eq!(report.warnings_count(), 2);
    assert!(!report.requirements.is_valid);
    assert_eq!(report.requirements.news_count, 4);
    assert_eq!(report.requirements.items_below_tag_minimum, 1);
    assert_eq!(
        report.errors_by_category().get(&ErrorCategory::Format),
        Some(&1)
    );
}

#[test]
fn test_non_utf8_manifest_is_fatal() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("manifest.txt"), [0xC3, 0x28, b'\n']).unwrap();
    let msg = validate_path(tmp.path(), &ValidationConfig::default())
        .unwrap_err()
        .to_string();
    assert!(msg.contains("not valid UTF-8"), "got: {msg}");
}

#[test]
fn test_custom_manifest_name() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("index.txt"),
        format!("a.jpg | ФОТО | T | D | 2024-01-01 | {TAGS}\n"),
    )
    .unwrap();
    fs::write(tmp.path().join("a.jpg"), b"jpeg").unwrap();

    let mut config = ValidationConfig::default();
    assert!(validate_path(tmp.path(), &config).is_err());

    config.manifest_name = "index.txt".to_owned();
    let report = validate_path(tmp.path(), &config).unwrap();
    assert_eq!(report.items.len(), 1);
    assert!(report.errors.is_empty());
}

#[test]
fn test_json_output_contract() {
    let tmp = TempDir::new().unwrap();
    let (manifest, files) = complete_capsule();
    let path = zip_capsule(&tmp, &manifest, &files);
    let report = validate_path(&path, &ValidationConfig::default()).unwrap();

    let mut buf = Vec::new();
    capsule_validator::output::write_json(&report, &mut buf).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    assert!(json["ok"].as_bool().unwrap());
    assert_eq!(json["items"].as_array().unwrap().len(), 12);
    assert_eq!(json["items"][0]["type"], "НОВОСТИ");
    assert_eq!(json["items"][0]["category"], "news");
    assert!(json["errors"].as_array().unwrap().is_empty());
    assert_eq!(json["requirements"]["news_count"], 5);
}

#[test]
fn test_write_human_success_output() {
    let tmp = TempDir::new().unwrap();
    let (manifest, files) = complete_capsule();
    let path = zip_capsule(&tmp, &manifest, &files);
    let report = validate_path(&path, &ValidationConfig::default()).unwrap();

    let mut buf = Vec::new();
    capsule_validator::output::write_human(&report, &mut buf).unwrap();
    let output = String::from_utf8(buf).unwrap();

    assert!(output.contains("TIME CAPSULE VALIDATOR"), "got: {output}");
    assert!(output.contains("Items:          12"));
    assert!(output.contains("All 12 items passed"));
    assert!(!output.contains("DIAGNOSTICS"));
}

#[test]
fn test_write_human_failure_output() {
    let tmp = TempDir::new().unwrap();
    let manifest = "a.jpg | ФОТО | T | 2024-01-01\n";
    let path = zip_capsule(&tmp, manifest, &[]);
    let report = validate_path(&path, &ValidationConfig::default()).unwrap();

    let mut buf = Vec::new();
    capsule_validator::output::write_human(&report, &mut buf).unwrap();
    let output = String::from_utf8(buf).unwrap();

    assert!(output.contains("DIAGNOSTICS"));
    assert!(output.contains("error: line 1: [critical]"), "got: {output}");
    assert!(output.contains("warning: line 1: [tag]"), "got: {output}");
    assert!(output.contains("Archive requirements not met"));
    assert!(output.contains("At least 5 news items required"));
}
