use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::errors::ApiError;

use super::parser::{extension_of, parse_document};

/// Text extracted from one uploaded file.
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    pub filename: String,
    pub text: String,
}

/// Writes uploads to a scratch directory before handing them to the parser.
#[derive(Debug, Clone)]
pub struct UploadProcessor {
    scratch_dir: PathBuf,
}

impl UploadProcessor {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Persists `bytes` to a uniquely named temp file that keeps the original
    /// extension, parses it on the blocking pool and removes the file.
    pub async fn process(&self, filename: &str, bytes: Vec<u8>) -> Result<ParsedUpload, ApiError> {
        let display_name = base_name(filename);
        let ext = extension_of(Path::new(&display_name));
        let scratch_dir = self.scratch_dir.clone();

        tracing::info!("Parsing upload {} ({} bytes)", display_name, bytes.len());

        let text = tokio::task::spawn_blocking(move || -> Result<String, ApiError> {
            std::fs::create_dir_all(&scratch_dir).map_err(ApiError::internal)?;
            let mut temp = tempfile::Builder::new()
                .prefix("upload_")
                .suffix(&ext)
                .tempfile_in(&scratch_dir)
                .map_err(ApiError::internal)?;
            temp.write_all(&bytes).map_err(ApiError::internal)?;
            temp.flush().map_err(ApiError::internal)?;

            let text = parse_document(temp.path());
            temp.close().map_err(ApiError::internal)?;
            Ok(text)
        })
        .await
        .map_err(|e| ApiError::internal(format!("Document parser crashed: {}", e)))??;

        Ok(ParsedUpload {
            filename: display_name,
            text,
        })
    }
}

/// Client-supplied names may carry directories; only the last component is kept.
fn base_name(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("upload")
        .to_string()
}
