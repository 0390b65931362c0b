//! Regex-driven classifiers for headings and list items in plain text.
//!
//! The tables are built once and shared read-only across calls; classification
//! is pure, so identical input always yields identical results. Used only by
//! the plain-text extractor.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::ListItemType;

/// Heading candidates longer than this are rejected outright.
pub const MAX_HEADING_CHARS: usize = 100;

/// Sentence-terminal punctuation that disqualifies a heading candidate.
const TERMINAL_PUNCTUATION: [char; 4] = ['。', '，', '！', '？'];

pub struct HeadingPattern {
    pub regex: Regex,
    pub level: u8,
}

pub struct ListPattern {
    pub regex: Regex,
    pub item_type: ListItemType,
}

/// Ordered heading pattern table; first match wins for level assignment.
pub fn heading_patterns() -> &'static [HeadingPattern] {
    static PATTERNS: OnceLock<Vec<HeadingPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // CJK chapter/section markers: 第一章, 第二节, 第三篇
            (r"^第[一二三四五六七八九十百千万]+[章节篇]", 1),
            // Arabic-numeral outline levels
            (r"^\d+\.\s+\S", 2),
            (r"^\d+\.\d+\.\s+\S", 3),
            // Capitalized English phrase start
            (r"^[A-Z][a-z]+\s+\S", 2),
            // All-caps line
            (r"^[A-Z][A-Z\s]+$", 1),
            // CJK enumerated heading: 一、
            (r"^[一二三四五六七八九十]+、\s*\S", 2),
            // Bracket-delimited short titles
            (r"^【[^】]+】", 2),
            (r"^\[[^\]]+\]", 2),
            (r"^（[^）]+）", 2),
            (r"^\([^)]+\)", 2),
        ]
        .into_iter()
        .map(|(pattern, level)| HeadingPattern {
            regex: Regex::new(pattern).expect("invalid heading pattern"),
            level,
        })
        .collect()
    })
}

/// Ordered list marker table; first match wins for type assignment.
pub fn list_patterns() -> &'static [ListPattern] {
    static PATTERNS: OnceLock<Vec<ListPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"^\d+[.、]\s*\S", ListItemType::Number),
            (r"^[a-z][.、]\s*\S", ListItemType::Alpha),
            (r"^[A-Z][.、]\s*\S", ListItemType::AlphaUpper),
            (r"^[一二三四五六七八九十]+[.、]\s*\S", ListItemType::Chinese),
            (r"^[•\-*]\s*\S", ListItemType::Bullet),
            (r"^[○●◆◇■□]\s*\S", ListItemType::Symbol),
        ]
        .into_iter()
        .map(|(pattern, item_type)| ListPattern {
            regex: Regex::new(pattern).expect("invalid list pattern"),
            item_type,
        })
        .collect()
    })
}

fn marker_strippers() -> &'static [Regex] {
    static STRIPPERS: OnceLock<Vec<Regex>> = OnceLock::new();
    STRIPPERS.get_or_init(|| {
        [
            r"^(?:\d+|[a-zA-Z]|[一二三四五六七八九十]+)[.、]\s*",
            r"^[•\-*○●◆◇■□]\s*",
        ]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("invalid marker pattern"))
        .collect()
    })
}

/// Whether a candidate line reads as a heading.
///
/// Rejects long lines, lines ending in sentence-terminal punctuation, and
/// anything that matches a list marker — list classification takes
/// precedence over heading classification.
pub fn is_heading(text: &str) -> bool {
    if text.chars().count() > MAX_HEADING_CHARS {
        return false;
    }
    if let Some(last) = text.chars().last() {
        if TERMINAL_PUNCTUATION.contains(&last) {
            return false;
        }
    }
    if is_list_item(text) {
        return false;
    }
    heading_patterns().iter().any(|p| p.regex.is_match(text))
}

/// Level of a heading line, per the first matching table entry. Defaults to 1
/// when no entry matches (callers only reach this after `is_heading`).
pub fn heading_level(text: &str) -> u8 {
    heading_patterns()
        .iter()
        .find(|p| p.regex.is_match(text))
        .map(|p| p.level)
        .unwrap_or(1)
}

pub fn is_list_item(text: &str) -> bool {
    list_patterns().iter().any(|p| p.regex.is_match(text))
}

/// Marker type of one list line, `Unknown` when nothing matches.
pub fn list_item_type(line: &str) -> ListItemType {
    list_patterns()
        .iter()
        .find(|p| p.regex.is_match(line))
        .map(|p| p.item_type)
        .unwrap_or(ListItemType::Unknown)
}

/// Strips the leading list marker from a line.
pub fn strip_list_marker(line: &str) -> String {
    let mut stripped = line.to_string();
    for stripper in marker_strippers() {
        stripped = stripper.replace(&stripped, "").into_owned();
    }
    stripped.trim().to_string()
}
