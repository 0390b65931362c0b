use std::path::Path;

use serde_json::json;

use crate::error::{ExtractError, Result};
use crate::models::{ContentBlock, ContentDocument, Metadata, SourceType};

const CAUTIONS: &str =
    "PDF pages may contain images and tables; only their text content is extracted";

/// Info dictionary keys carried into metadata, with their output names.
const INFO_FIELDS: [(&[u8], &str); 5] = [
    (b"Author", "author"),
    (b"Creator", "creator"),
    (b"Producer", "producer"),
    (b"Subject", "subject"),
    (b"Title", "title"),
];

pub struct PdfExtractor;

impl PdfExtractor {
    pub fn extract(path: &Path) -> Result<ContentDocument> {
        let bytes = std::fs::read(path)
            .map_err(|e| ExtractError::NoValidContent(format!("failed to read PDF file: {e}")))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::extract_bytes(&bytes, &file_name)
    }

    pub fn extract_bytes(bytes: &[u8], source_name: &str) -> Result<ContentDocument> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractError::NoValidContent(format!("PDF extraction failed: {e}")))?;

        let mut content = Vec::new();
        for (idx, page_text) in pages.iter().enumerate() {
            let page_number = idx + 1;
            let trimmed = page_text.trim();
            if trimmed.is_empty() {
                tracing::debug!(page = page_number, "skipping blank page");
                continue;
            }
            content.push(ContentBlock::page_paragraph(page_number, trimmed));
        }

        if content.is_empty() {
            return Err(ExtractError::NoValidContent(
                "no text could be extracted from any page of the PDF".to_string(),
            ));
        }

        let metadata = Self::extract_metadata(bytes);
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

    /// Document info dictionary plus page count. Metadata is best-effort:
    /// a PDF whose text extracted fine still yields a document even when its
    /// structure resists a second parse.
    fn extract_metadata(bytes: &[u8]) -> Metadata {
        let mut metadata = Metadata::new();

        let doc = match lopdf::Document::load_mem(bytes) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("failed to load PDF for metadata: {e}");
                return metadata;
            }
        };

        metadata.insert("page_count".to_string(), json!(doc.get_pages().len()));

        let info = doc
            .trailer
            .get(b"Info")
            .and_then(|obj| obj.as_reference())
            .and_then(|id| doc.get_dictionary(id));
        let Ok(info) = info else {
            return metadata;
        };

        for (key, name) in INFO_FIELDS {
            if let Ok(lopdf::Object::String(raw, _)) = info.get(key) {
                let value = decode_pdf_string(raw);
                if !value.is_empty() {
                    metadata.insert(name.to_string(), json!(value));
                }
            }
        }

        metadata
    }
}

/// PDF text strings are either UTF-16BE (with a BOM) or PDFDocEncoding;
/// the latter is close enough to Latin-1 that a lossy UTF-8 read serves.
fn decode_pdf_string(raw: &[u8]) -> String {
    if raw.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = raw[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units).trim().to_string()
    } else {
        String::from_utf8_lossy(raw).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_string() {
        assert_eq!(decode_pdf_string(b"Jane Author"), "Jane Author");
    }

    #[test]
    fn test_decode_utf16be_string() {
        let mut raw = vec![0xFE, 0xFF];
        for unit in "标题".encode_utf16() {
            raw.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_pdf_string(&raw), "标题");
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        let result = PdfExtractor::extract_bytes(b"not a pdf at all", "bogus.pdf");
        assert!(matches!(result, Err(ExtractError::NoValidContent(_))));
    }
}
