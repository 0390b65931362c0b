//! Content extraction and structuring for PDF, Word, plain-text, and web
//! sources.
//!
//! Every extractor produces the same [`ContentDocument`] shape: a flat,
//! ordered list of typed blocks (headings, paragraphs, lists, tables) plus
//! source-level metadata, so downstream consumers never branch on where the
//! content came from. [`ContentExtractor`] is the entry point; the
//! per-format extractors under [`extractors`] can also be used directly.

pub mod config;
pub mod error;
pub mod extractor;
pub mod extractors;
pub mod models;

pub use config::ExtractionConfig;
pub use error::{ExtractError, Result};
pub use extractor::{ContentExtractor, SUPPORTED_EXTENSIONS};
pub use models::{
    BlockText, ContentBlock, ContentDocument, ContentType, ListItem, ListItemType, Metadata,
    SourceType,
};
