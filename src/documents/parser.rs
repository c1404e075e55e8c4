use std::fs;
use std::path::Path;

use crate::web::html_to_text;

/// Extractor chosen from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
    Html,
}

impl DocumentKind {
    /// `ext` is lower-cased and includes the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".pdf" => Some(DocumentKind::Pdf),
            ".txt" | ".md" | ".markdown" | ".csv" => Some(DocumentKind::PlainText),
            ".html" | ".htm" => Some(DocumentKind::Html),
            _ => None,
        }
    }
}

/// Lower-cased extension with its dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// Extracts text from a file on disk.
///
/// Never fails: problems are reported in the returned text, matching what the
/// upload endpoint hands back to the client.
pub fn parse_document(path: &Path) -> String {
    if !path.exists() {
        return "File not found.".to_string();
    }

    let ext = extension_of(path);
    let Some(kind) = DocumentKind::from_extension(&ext) else {
        return format!("Unsupported file type: {}", ext);
    };

    let extracted = match kind {
        DocumentKind::Pdf => extract_pdf(path),
        DocumentKind::PlainText => fs::read_to_string(path).map_err(|e| e.to_string()),
        DocumentKind::Html => fs::read_to_string(path)
            .map(|html| html_to_text(&html))
            .map_err(|e| e.to_string()),
    };

    match extracted {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            tracing::warn!("Failed to parse {}: {}", path.display(), err);
            format!("Error parsing document: {}", err)
        }
    }
}

fn extract_pdf(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())?;

    // Keep non-blank lines only; pdf-extract pads page breaks with empty lines.
    Ok(text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}
