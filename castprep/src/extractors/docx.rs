use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use serde_json::json;
use zip::ZipArchive;

use crate::error::{ExtractError, Result};
use crate::models::{ContentBlock, ContentDocument, Metadata, SourceType};

const DEFAULT_SECTION: &str = "Unnamed Section";
const CAUTIONS: &str = "Word documents may contain images and rich formatting; only text content is extracted, and tables are appended after the paragraph flow";

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn extract(path: &Path) -> Result<ContentDocument> {
        let bytes = std::fs::read(path).map_err(|e| {
            ExtractError::NoValidContent(format!("failed to read Word document: {e}"))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::extract_bytes(&bytes, &file_name)
    }

    pub fn extract_bytes(bytes: &[u8], source_name: &str) -> Result<ContentDocument> {
        let docx = docx_rs::read_docx(bytes).map_err(|e| {
            ExtractError::NoValidContent(format!("failed to parse Word document: {e}"))
        })?;

        let mut content = Vec::new();
        let mut current_section: Option<String> = None;
        let mut paragraph_count = 0usize;

        // Paragraphs first, in document order.
        for child in &docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                paragraph_count += 1;
                let text = Self::paragraph_text(paragraph);
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }

                if let Some(level) = Self::heading_level(paragraph) {
                    current_section = Some(text.to_string());
                    content.push(ContentBlock::heading(text, level));
                } else {
                    let section = current_section
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SECTION.to_string());
                    content.push(ContentBlock::paragraph(section, text));
                }
            }
        }

        // A document whose paragraph traversal yields nothing is rejected
        // even when tables exist.
        if content.is_empty() {
            return Err(ExtractError::NoValidContent(
                "no text content could be extracted from the Word document".to_string(),
            ));
        }

        // Tables are appended after all paragraph content, attributed to the
        // section that was current when paragraph traversal ended.
        let table_section = current_section.unwrap_or_else(|| DEFAULT_SECTION.to_string());
        for child in &docx.document.children {
            if let docx_rs::DocumentChild::Table(table) = child {
                let rows = Self::table_rows(table);
                if !rows.is_empty() {
                    content.push(ContentBlock::table(table_section.clone(), rows));
                }
            }
        }

        let mut metadata = Self::core_properties(bytes);
        metadata.insert("paragraph_count".to_string(), json!(paragraph_count));
        let section_count = content
            .iter()
            .map(|block| block.section_title.as_str())
            .collect::<HashSet<_>>()
            .len();
        metadata.insert("section_count".to_string(), json!(section_count));

        let title = metadata
            .get("title")
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| source_name.to_string());

        Ok(ContentDocument {
            source_type: SourceType::File,
            title,
            metadata,
            content,
            key_points: Vec::new(),
            cautions: CAUTIONS.to_string(),
        })
    }

    /// Heading level from the paragraph style: any style named `Heading*`
    /// counts, the level coming from the trailing digit (1 when absent).
    fn heading_level(paragraph: &docx_rs::Paragraph) -> Option<u8> {
        let style = paragraph.property.style.as_ref()?;
        if !style.val.starts_with("Heading") {
            return None;
        }
        let level = style
            .val
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .map(|d| d as u8)
            .unwrap_or(1);
        Some(level)
    }

    fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
        let mut content = String::new();
        for para_child in &paragraph.children {
            if let docx_rs::ParagraphChild::Run(run) = para_child {
                for run_child in &run.children {
                    if let docx_rs::RunChild::Text(text) = run_child {
                        content.push_str(&text.text);
                    }
                }
            }
        }
        content
    }

    fn table_rows(table: &docx_rs::Table) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        for table_child in &table.rows {
            let docx_rs::TableChild::TableRow(row) = table_child;
            let mut cells = Vec::new();
            for row_child in &row.cells {
                let docx_rs::TableRowChild::TableCell(cell) = row_child;
                let mut cell_text = String::new();
                for cell_child in &cell.children {
                    if let docx_rs::TableCellContent::Paragraph(para) = cell_child {
                        let para_text = Self::paragraph_text(para);
                        if !cell_text.is_empty() {
                            cell_text.push(' ');
                        }
                        cell_text.push_str(&para_text);
                    }
                }
                cells.push(cell_text.trim().to_string());
            }
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
        rows
    }

    /// Reads `docProps/core.xml` straight out of the OPC package; docx-rs
    /// does not surface core properties on read.
    fn core_properties(bytes: &[u8]) -> Metadata {
        let mut metadata = Metadata::new();

        let cursor = Cursor::new(bytes);
        let Ok(mut archive) = ZipArchive::new(cursor) else {
            return metadata;
        };
        let mut xml = String::new();
        {
            let Ok(mut file) = archive.by_name("docProps/core.xml") else {
                return metadata;
            };
            if file.read_to_string(&mut xml).is_err() {
                return metadata;
            }
        }

        let mut reader = Reader::from_str(&xml);

        let mut buf = Vec::new();
        let mut current_key: Option<&'static str> = None;
        let mut value = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    current_key = match e.name().as_ref() {
                        b"dc:creator" => Some("author"),
                        b"dcterms:created" => Some("created"),
                        b"dcterms:modified" => Some("modified"),
                        b"dc:title" => Some("title"),
                        b"dc:subject" => Some("subject"),
                        b"cp:keywords" => Some("keywords"),
                        _ => None,
                    };
                    value.clear();
                }
                Ok(Event::Text(e)) => {
                    if current_key.is_some() {
                        if let Ok(text) = std::str::from_utf8(e.as_ref()) {
                            value.push_str(text);
                        }
                    }
                }
                // Entity and character references arrive as their own events,
                // splitting the surrounding text.
                Ok(Event::GeneralRef(e)) => {
                    if current_key.is_some() {
                        if let Some(ch) = Self::resolve_reference(&e) {
                            value.push(ch);
                        }
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some(key) = current_key.take() {
                        let text = value.trim();
                        if !text.is_empty() {
                            metadata.insert(key.to_string(), json!(text));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    tracing::warn!("error parsing docProps/core.xml: {e}");
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        metadata
    }

    fn resolve_reference(reference: &BytesRef) -> Option<char> {
        if let Ok(Some(ch)) = reference.resolve_char_ref() {
            return Some(ch);
        }
        let name: &[u8] = reference.as_ref();
        match name {
            b"amp" => Some('&'),
            b"lt" => Some('<'),
            b"gt" => Some('>'),
            b"apos" => Some('\''),
            b"quot" => Some('"'),
            _ => None,
        }
    }
}
