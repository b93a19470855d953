//! Text extraction from uploaded documents.
//!
//! Only plain text is read. PDF and DOCX are accepted and stored but no
//! parsing is attempted: the caller gets `None` and the client must supply
//! the résumé text itself.

use crate::errors::AppError;

pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

/// Upload formats the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Resolves the format from the declared content type, falling back to the
    /// file extension when the type is missing or generic.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        let declared = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());
        match declared.as_deref() {
            Some(MIME_PDF) => return Some(DocumentFormat::Pdf),
            Some(MIME_DOCX) => return Some(DocumentFormat::Docx),
            Some(MIME_TEXT) => return Some(DocumentFormat::PlainText),
            Some("application/octet-stream") | None => {}
            Some(_) => return None,
        }

        let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::PlainText),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => MIME_PDF,
            DocumentFormat::Docx => MIME_DOCX,
            DocumentFormat::PlainText => MIME_TEXT,
        }
    }
}

/// Returns the document's text, or `None` for formats that are not parsed.
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> Result<Option<String>, AppError> {
    match format {
        DocumentFormat::PlainText => {
            let text = std::str::from_utf8(bytes).map_err(|_| {
                AppError::Validation("Text file is not valid UTF-8".to_string())
            })?;
            let text = text.trim_start_matches('\u{feff}').trim();
            Ok((!text.is_empty()).then(|| text.to_string()))
        }
        DocumentFormat::Pdf | DocumentFormat::Docx => Ok(None),
    }
}
