use std::fs;
use std::path::PathBuf;

use castprep::{ContentExtractor, ContentType, ExtractError, ListItemType, SourceType};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write test file");
    path
}

#[test]
fn test_chapter_heading_then_numbered_list() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "report.txt",
        "第一章 引言\n这是内容。\n\n1. 要点一\n2. 要点二".as_bytes(),
    );

    let extractor = ContentExtractor::new();
    let doc = extractor.process_file(&path).expect("extraction failed");

    assert_eq!(doc.source_type, SourceType::File);
    assert_eq!(doc.content.len(), 2);

    let heading = &doc.content[0];
    assert_eq!(heading.content_type, ContentType::Heading);
    assert_eq!(heading.section_title, "第一章 引言");
    assert_eq!(heading.level, Some(1));

    let list = &doc.content[1];
    assert_eq!(list.content_type, ContentType::List);
    assert_eq!(list.section_title, "第一章 引言");
    assert_eq!(list.list_type, Some(ListItemType::Number));
    let items = list.as_items().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].text, "要点一");
    assert_eq!(items[1].text, "要点二");
}

#[test]
fn test_crlf_file_keeps_all_blocks() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "windows.txt",
        "第一章 引言\r\n这是内容。\r\n\r\n1. 要点一\r\n2. 要点二".as_bytes(),
    );

    let extractor = ContentExtractor::new();
    let doc = extractor.process_file(&path).expect("extraction failed");

    // Same structure as the LF version: the list must not be swallowed by
    // the heading candidate.
    assert_eq!(doc.content.len(), 2);
    assert_eq!(doc.content[0].content_type, ContentType::Heading);
    assert_eq!(doc.content[0].section_title, "第一章 引言");
    let list = &doc.content[1];
    assert_eq!(list.content_type, ContentType::List);
    assert_eq!(list.section_title, "第一章 引言");
    assert_eq!(list.as_items().unwrap().len(), 2);
}

#[test]
fn test_empty_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.txt", b"");

    let extractor = ContentExtractor::new();
    let err = extractor.process_file(&path).unwrap_err();
    assert!(matches!(err, ExtractError::NoValidContent(_)));
}

#[test]
fn test_whitespace_only_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "blank.txt", b"  \n\n\t\n");

    let extractor = ContentExtractor::new();
    let err = extractor.process_file(&path).unwrap_err();
    assert!(matches!(err, ExtractError::NoValidContent(_)));
}

#[test]
fn test_non_utf8_file_reports_encoding() {
    let dir = TempDir::new().unwrap();
    // GBK-encoded bytes, not valid UTF-8.
    let path = write_file(&dir, "legacy.txt", &[0xC4, 0xE3, 0xBA, 0xC3, 0xFF]);

    let extractor = ContentExtractor::new();
    let err = extractor.process_file(&path).unwrap_err();
    assert!(matches!(err, ExtractError::NoValidContent(_)));
    assert!(
        err.to_string().contains("UTF-8"),
        "error should name the encoding problem: {err}"
    );
}

#[test]
fn test_metadata_counts_and_title() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "notes.txt",
        "标题行\n\n正文第一段。\n\n正文第二段。".as_bytes(),
    );

    let extractor = ContentExtractor::new();
    let doc = extractor.process_file(&path).expect("extraction failed");

    assert_eq!(doc.title, "标题行");
    assert_eq!(doc.metadata["total_lines"], 5);
    assert_eq!(doc.metadata["non_empty_lines"], 3);
    assert_eq!(doc.metadata["word_count"], 3);
    assert!(doc.metadata["file_size"].as_u64().unwrap() > 0);
}

#[test]
fn test_extraction_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "stable.txt",
        "【概述】\n\n这一段描述了文档的目的。\n\n- 第一点\n- 第二点".as_bytes(),
    );

    let extractor = ContentExtractor::new();
    let first = extractor.process_file(&path).expect("first pass failed");
    let second = extractor.process_file(&path).expect("second pass failed");
    assert_eq!(first, second);
}

#[test]
fn test_document_contract() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "plain.txt", "这是一段普通的正文内容。".as_bytes());

    let extractor = ContentExtractor::new();
    let doc = extractor.process_file(&path).expect("extraction failed");

    assert!(!doc.content.is_empty());
    assert!(doc.key_points.is_empty(), "key_points are filled downstream");
    assert!(!doc.cautions.is_empty());
}
