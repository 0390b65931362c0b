use std::path::Path;

use crate::config::ExtractionConfig;
use crate::error::{ExtractError, Result};
use crate::extractors::{DocxExtractor, PdfExtractor, TextExtractor, WebExtractor};
use crate::models::ContentDocument;

/// File extensions the dispatcher routes to an extractor.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".pdf", ".doc", ".docx", ".txt"];

/// Front door for content extraction: routes local files by extension and
/// URLs to the web extractor, returning the same document shape either way.
pub struct ContentExtractor {
    web: WebExtractor,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self::with_config(&ExtractionConfig::default())
    }

    pub fn with_config(config: &ExtractionConfig) -> Self {
        Self {
            web: WebExtractor::new(config),
        }
    }

    /// Extracts a local file. Existence is checked before the extension, so
    /// a missing file reports as missing even when its format is unsupported.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<ContentDocument> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.display().to_string()));
        }

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        tracing::info!(path = %path.display(), %extension, "extracting file");

        match extension.as_str() {
            ".pdf" => PdfExtractor::extract(path),
            ".doc" | ".docx" => DocxExtractor::extract(path),
            ".txt" => TextExtractor::extract(path),
            _ => Err(ExtractError::UnsupportedFormat(format!(
                "{} (supported: {})",
                extension,
                SUPPORTED_EXTENSIONS.join(", ")
            ))),
        }
    }

    /// Fetches and extracts a web page.
    pub async fn process_url(&self, url: &str) -> Result<ContentDocument> {
        tracing::info!(url, "extracting web page");
        self.web.extract(url).await
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}
