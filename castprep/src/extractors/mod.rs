pub mod docx;
pub mod patterns;
pub mod pdf;
pub mod text;
pub mod web;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use text::TextExtractor;
pub use web::WebExtractor;
