pub mod native_parser;
pub mod types;

pub use native_parser::{extract, extract_document};
pub use types::{document_label, Document, DocumentFormat, NormalizedText};
