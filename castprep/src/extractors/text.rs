use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::error::{ExtractError, Result};
use crate::extractors::patterns;
use crate::models::{
    ContentBlock, ContentDocument, ListItem, ListItemType, Metadata, SourceType,
};

const DEFAULT_SECTION: &str = "Unnamed Section";
const CAUTIONS: &str =
    "Plain text only: any special formatting in the source file is not preserved";

pub struct TextExtractor;

impl TextExtractor {
    pub fn extract(path: &Path) -> Result<ContentDocument> {
        let bytes = std::fs::read(path)
            .map_err(|e| ExtractError::NoValidContent(format!("failed to read text file: {e}")))?;

        let content = String::from_utf8(bytes).map_err(|_| {
            ExtractError::NoValidContent(
                "file is not valid UTF-8; re-encode it as UTF-8 and retry".to_string(),
            )
        })?;

        if content.trim().is_empty() {
            return Err(ExtractError::NoValidContent("file is empty".to_string()));
        }

        let blocks = Self::structure(&content);
        if blocks.is_empty() {
            return Err(ExtractError::NoValidContent(
                "no structured content could be extracted from the text file".to_string(),
            ));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = Self::extract_metadata(path, &content, &file_name);

        let title = metadata
            .get("title")
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or(file_name);

        Ok(ContentDocument {
            source_type: SourceType::File,
            title,
            metadata,
            content: blocks,
            key_points: Vec::new(),
            cautions: CAUTIONS.to_string(),
        })
    }

    /// Splits text into blank-line-separated candidates and classifies each
    /// as heading, list, or paragraph. Classification is pure: identical
    /// input yields identical blocks.
    fn structure(content: &str) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();
        let mut current_section = DEFAULT_SECTION.to_string();

        // Windows files arrive with CRLF; normalize so blank-line
        // segmentation sees the boundaries.
        let content = content.replace("\r\n", "\n");
        let candidates = content
            .split("\n\n")
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty());

        for candidate in candidates {
            // The heading test looks at the first line only; a heading line
            // subsumes the rest of its candidate.
            let first_line = candidate.lines().next().unwrap_or(candidate).trim();

            if patterns::is_heading(first_line) {
                current_section = first_line.to_string();
                blocks.push(ContentBlock::heading(
                    first_line,
                    patterns::heading_level(first_line),
                ));
            } else if patterns::is_list_item(candidate) {
                let items = Self::list_items(candidate);
                if !items.is_empty() {
                    blocks.push(ContentBlock::list(current_section.clone(), items));
                }
            } else {
                blocks.push(ContentBlock::paragraph(current_section.clone(), candidate));
            }
        }

        blocks
    }

    /// Tags each marker-bearing line of a list candidate and strips its
    /// marker prefix; lines without a recognized marker are skipped.
    fn list_items(candidate: &str) -> Vec<ListItem> {
        candidate
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| {
                let item_type = patterns::list_item_type(line);
                if item_type == ListItemType::Unknown {
                    tracing::debug!(line, "skipping unrecognized list line");
                    return None;
                }
                Some(ListItem {
                    text: patterns::strip_list_marker(line),
                    item_type,
                })
            })
            .collect()
    }

    fn extract_metadata(path: &Path, content: &str, file_name: &str) -> Metadata {
        let mut metadata = Metadata::new();

        let first_line = content.lines().next().unwrap_or("").trim();
        let title = if !first_line.is_empty() && first_line.chars().count() <= 100 {
            first_line.to_string()
        } else {
            file_name.to_string()
        };
        metadata.insert("title".to_string(), json!(title));

        if let Ok(stats) = std::fs::metadata(path) {
            metadata.insert("file_size".to_string(), json!(stats.len()));
            if let Ok(created) = stats.created() {
                let created: DateTime<Utc> = created.into();
                metadata.insert("created_time".to_string(), json!(created.to_rfc3339()));
            }
            if let Ok(modified) = stats.modified() {
                let modified: DateTime<Utc> = modified.into();
                metadata.insert("modified_time".to_string(), json!(modified.to_rfc3339()));
            }
        }

        let total_lines = content.lines().count();
        let non_empty_lines = content.lines().filter(|line| !line.trim().is_empty()).count();
        metadata.insert("total_lines".to_string(), json!(total_lines));
        metadata.insert("non_empty_lines".to_string(), json!(non_empty_lines));
        metadata.insert(
            "word_count".to_string(),
            json!(content.split_whitespace().count()),
        );

        metadata
    }
}
