//! Uploaded document text extraction.

mod parser;
mod upload;

pub use parser::{extension_of, parse_document, DocumentKind};
pub use upload::{ParsedUpload, UploadProcessor};
