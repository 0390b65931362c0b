use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Source-type-dependent metadata: author/creation date for documents,
/// URL/domain/content-type for web pages, file size and line counts for text
/// files. Absent fields are omitted, never defaulted.
pub type Metadata = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    File,
    Web,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Heading,
    Paragraph,
    List,
    Table,
}

/// Marker style of a recognized list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListItemType {
    Number,
    Alpha,
    AlphaUpper,
    Chinese,
    Bullet,
    Symbol,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    #[serde(rename = "type")]
    pub item_type: ListItemType,
}

/// Payload of a content block; shape depends on the block's `content_type`.
/// Headings carry `Plain("")` — their text lives in `section_title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockText {
    Plain(String),
    Items(Vec<ListItem>),
    Rows(Vec<Vec<String>>),
}

/// The atomic unit of extracted text.
///
/// `section_title` on a non-heading block is the text of the nearest
/// preceding heading, or a default placeholder if no heading has occurred
/// yet. `level` is present only for headings, `page_number` only for PDF
/// paragraphs, `list_type` only for lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub section_title: String,
    pub content_type: ContentType,
    pub text: BlockText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListItemType>,
}

impl ContentBlock {
    pub fn heading(title: impl Into<String>, level: u8) -> Self {
        Self {
            section_title: title.into(),
            content_type: ContentType::Heading,
            text: BlockText::Plain(String::new()),
            level: Some(level),
            page_number: None,
            list_type: None,
        }
    }

    pub fn paragraph(section_title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            section_title: section_title.into(),
            content_type: ContentType::Paragraph,
            text: BlockText::Plain(text.into()),
            level: None,
            page_number: None,
            list_type: None,
        }
    }

    /// A PDF page paragraph, attributed to a synthesized "Page N" section.
    pub fn page_paragraph(page_number: usize, text: impl Into<String>) -> Self {
        Self {
            section_title: format!("Page {page_number}"),
            content_type: ContentType::Paragraph,
            text: BlockText::Plain(text.into()),
            level: None,
            page_number: Some(page_number),
            list_type: None,
        }
    }

    /// A list block tagged with the type of its first item.
    pub fn list(section_title: impl Into<String>, items: Vec<ListItem>) -> Self {
        let list_type = items.first().map(|item| item.item_type);
        Self {
            section_title: section_title.into(),
            content_type: ContentType::List,
            text: BlockText::Items(items),
            level: None,
            page_number: None,
            list_type,
        }
    }

    pub fn table(section_title: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            section_title: section_title.into(),
            content_type: ContentType::Table,
            text: BlockText::Rows(rows),
            level: None,
            page_number: None,
            list_type: None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.content_type == ContentType::Heading
    }

    /// Plain text payload, if this is a paragraph (or heading) block.
    pub fn as_plain(&self) -> Option<&str> {
        match &self.text {
            BlockText::Plain(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[ListItem]> {
        match &self.text {
            BlockText::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[Vec<String>]> {
        match &self.text {
            BlockText::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

/// The canonical extraction result for one source.
///
/// Constructed fresh per extraction call and fully populated before return.
/// `content` is never empty on success: an extractor that produces zero
/// blocks fails with `NoValidContent` instead. `key_points` is always empty
/// at this layer; it is populated later by the script-generation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub source_type: SourceType,
    pub title: String,
    pub metadata: Metadata,
    pub content: Vec<ContentBlock>,
    pub key_points: Vec<String>,
    pub cautions: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_block_has_empty_text() {
        let block = ContentBlock::heading("Introduction", 1);
        assert_eq!(block.section_title, "Introduction");
        assert_eq!(block.content_type, ContentType::Heading);
        assert_eq!(block.as_plain(), Some(""));
        assert_eq!(block.level, Some(1));
        assert_eq!(block.page_number, None);
    }

    #[test]
    fn test_list_block_tagged_with_first_item_type() {
        let block = ContentBlock::list(
            "Section",
            vec![
                ListItem {
                    text: "first".to_string(),
                    item_type: ListItemType::Number,
                },
                ListItem {
                    text: "second".to_string(),
                    item_type: ListItemType::Bullet,
                },
            ],
        );
        assert_eq!(block.list_type, Some(ListItemType::Number));
    }

    #[test]
    fn test_block_serialization_field_names() {
        let block = ContentBlock::page_paragraph(3, "body text");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["section_title"], "Page 3");
        assert_eq!(json["content_type"], "paragraph");
        assert_eq!(json["text"], "body text");
        assert_eq!(json["page_number"], 3);
        assert!(json.get("level").is_none());
    }

    #[test]
    fn test_list_item_serializes_type_field() {
        let item = ListItem {
            text: "point".to_string(),
            item_type: ListItemType::AlphaUpper,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "alpha_upper");
    }

    #[test]
    fn test_document_roundtrip() {
        let doc = ContentDocument {
            source_type: SourceType::Web,
            title: "Title".to_string(),
            metadata: Metadata::new(),
            content: vec![ContentBlock::paragraph("Body", "some text")],
            key_points: Vec::new(),
            cautions: "caveat".to_string(),
        };
        let json = serde_json::to_string(&doc).unwrap();
        let back: ContentDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
