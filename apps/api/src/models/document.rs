use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    Cv,
    CoverLetter,
    Certificate,
}

impl DocumentType {
    pub fn from_field(value: &str) -> Option<Self> {
        match value.trim() {
            "cv" => Some(DocumentType::Cv),
            "cover_letter" => Some(DocumentType::CoverLetter),
            "certificate" => Some(DocumentType::Certificate),
            _ => None,
        }
    }
}

/// An uploaded source document. `extracted_text` is null when the format
/// could not be read as text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub extracted_text: Option<String>,
    pub document_type: DocumentType,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_from_field() {
        assert_eq!(
            DocumentType::from_field("cover_letter"),
            Some(DocumentType::CoverLetter)
        );
        assert_eq!(DocumentType::from_field(" cv "), Some(DocumentType::Cv));
        assert_eq!(DocumentType::from_field("invoice"), None);
    }
}
