use thiserror::Error;

/// Failure kinds surfaced by the extraction engine.
///
/// Callers are expected to match on the variant, not the message text.
/// Extractors are all-or-nothing: any internal parse, decode, or fetch
/// failure is mapped to `NoValidContent` at the extractor boundary, with the
/// underlying cause embedded in the message. The one exception is an explicit
/// remote refusal (HTTP 403), which maps to `AccessDenied`.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("no valid content: {0}")]
    NoValidContent(String),

    #[error("access denied: {0}")]
    AccessDenied(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
