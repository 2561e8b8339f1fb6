use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Payload key every tenant-scoped read filters on.
pub const TENANT_KEY: &str = "tenant_id";

/// A non-empty tenant identifier. Listing points requires one, so an
/// unscoped listing cannot be written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "tenant identifier must not be empty".into(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TenantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Metadata stored with every ingested point.
///
/// `category` and `subcategory` group documents by folder or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub tenant_id: TenantId,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

impl Payload {
    pub fn new(tenant_id: TenantId, source: impl Into<String>) -> Self {
        Self {
            tenant_id,
            source: source.into(),
            category: None,
            subcategory: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_subcategory(mut self, subcategory: Option<String>) -> Self {
        self.subcategory = subcategory.filter(|c| !c.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tenant_id_rejects_blank() {
        assert!(TenantId::new("").is_err());
        assert!(TenantId::new("   ").is_err());
        assert_eq!(TenantId::new("acme").expect("tenant").as_str(), "acme");
    }

    #[test]
    fn test_payload_serializes_tenant_key_and_skips_empty_optionals() {
        let tenant = TenantId::new("acme").expect("tenant");
        let payload = Payload::new(tenant, "report.pdf")
            .with_category(Some("finance".into()))
            .with_subcategory(Some(String::new()));

        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(
            value,
            json!({ "tenant_id": "acme", "source": "report.pdf", "category": "finance" })
        );
        assert!(value.get(TENANT_KEY).is_some());
    }

    #[test]
    fn test_payload_deserialize_rejects_empty_tenant() {
        let result: Result<Payload, _> =
            serde_json::from_value(json!({ "tenant_id": "", "source": "a.pdf" }));
        assert!(result.is_err());
    }
}
