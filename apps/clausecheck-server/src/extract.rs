//! Text extraction from uploaded files.
//!
//! PDFs go through pdf-extract; anything else is decoded as UTF-8 with
//! lossy replacement. Extraction failure aborts the whole request since
//! there is nothing to analyze.

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("could not read PDF: {0}")]
    Pdf(String),
}

/// Extract raw text from an uploaded file.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::EmptyFile);
    }

    let is_pdf = filename.to_lowercase().ends_with(".pdf") || bytes.starts_with(b"%PDF");
    if is_pdf {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|err| ExtractionError::Pdf(err.to_string()))?;
        debug!(file = filename, chars = text.len(), "extracted PDF text");
        Ok(text)
    } else {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_decoded() {
        let text = extract_text(b"A late fee applies.", "terms.txt").unwrap();
        assert_eq!(text, "A late fee applies.");
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(matches!(
            extract_text(b"", "terms.txt"),
            Err(ExtractionError::EmptyFile)
        ));
    }

    #[test]
    fn corrupt_pdf_is_rejected() {
        let bytes = b"%PDF-1.7 this is not a real pdf body";
        assert!(matches!(
            extract_text(bytes, "contract.pdf"),
            Err(ExtractionError::Pdf(_))
        ));
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let bytes = [b'o', b'k', 0xFF, 0xFE, b'!'];
        let text = extract_text(&bytes, "notes.txt").unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.ends_with('!'));
    }
}
