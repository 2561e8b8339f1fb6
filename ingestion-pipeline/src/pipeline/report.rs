use std::{fmt, path::PathBuf};

use common::{error::AppError, storage::types::payload::TenantId};
use serde::Serialize;

/// One ingestion run: every `.pdf` in `folder` goes to `collection` under
/// `tenant_id`.
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    pub folder: PathBuf,
    pub collection: String,
    pub tenant_id: TenantId,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

impl IngestionRequest {
    pub fn new(
        folder: impl Into<PathBuf>,
        collection: impl Into<String>,
        tenant_id: &str,
    ) -> Result<Self, AppError> {
        let request = Self {
            folder: folder.into(),
            collection: collection.into(),
            tenant_id: TenantId::new(tenant_id)?,
            category: None,
            subcategory: None,
        };
        request.validate()?;
        Ok(request)
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_subcategory(mut self, subcategory: Option<String>) -> Self {
        self.subcategory = subcategory;
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.collection.trim().is_empty() {
            return Err(AppError::Validation(
                "collection name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyText,
    ExtractionFailed,
    EmbeddingFailed,
    DimensionMismatch,
    InvalidIdentifier,
    UpsertFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EmptyText => "empty text",
            Self::ExtractionFailed => "extraction failed",
            Self::EmbeddingFailed => "embedding failed",
            Self::DimensionMismatch => "dimension mismatch",
            Self::InvalidIdentifier => "invalid identifier",
            Self::UpsertFailed => "upsert failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub file: String,
    pub reason: SkipReason,
    pub detail: String,
}

/// Outcome of an ingestion run, listed per file in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub collection: String,
    pub tenant_id: String,
    pub inserted: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<SkippedDocument>,
    /// Set when existing points could not be listed and every document was
    /// treated as new.
    pub existing_lookup_degraded: bool,
}

impl IngestionReport {
    pub fn new(collection: &str, tenant_id: &TenantId) -> Self {
        Self {
            collection: collection.to_string(),
            tenant_id: tenant_id.to_string(),
            inserted: Vec::new(),
            updated: Vec::new(),
            skipped: Vec::new(),
            existing_lookup_degraded: false,
        }
    }

    pub fn upserted(&self) -> usize {
        self.inserted.len().saturating_add(self.updated.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_blank_collection_and_tenant() {
        assert!(matches!(
            IngestionRequest::new("/tmp", " ", "acme"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            IngestionRequest::new("/tmp", "docs", ""),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_report_serializes_reasons_in_snake_case() {
        let tenant = TenantId::new("acme").expect("tenant");
        let mut report = IngestionReport::new("docs", &tenant);
        report.inserted.push("a.pdf".into());
        report.skipped.push(SkippedDocument {
            file: "broken.pdf".into(),
            reason: SkipReason::ExtractionFailed,
            detail: "failed to parse PDF".into(),
        });

        let value = serde_json::to_value(&report).expect("serialize");
        assert_eq!(value["tenant_id"], "acme");
        assert_eq!(value["skipped"][0]["reason"], "extraction_failed");
        assert_eq!(value["existing_lookup_degraded"], false);
        assert_eq!(report.upserted(), 1);
    }
}
