use common::{error::AppError, storage::types::point::PointId};
use uuid::Uuid;

/// Derives the stable point identifier for a document: a UUIDv5 in the DNS
/// namespace over the file name bytes. The same name always maps to the same
/// point, which is what makes re-ingestion an update instead of a duplicate.
///
/// The tenant is not part of the name, so `report.pdf` ingested by two tenants
/// into one collection resolves to a single point and the later write wins.
pub fn derive_point_id(file_name: &str) -> Result<PointId, AppError> {
    if file_name.is_empty() {
        return Err(AppError::Validation(
            "cannot derive a point id from an empty file name".into(),
        ));
    }
    Ok(PointId::from(Uuid::new_v5(
        &Uuid::NAMESPACE_DNS,
        file_name.as_bytes(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let first = derive_point_id("report.pdf").expect("derive");
        let second = derive_point_id("report.pdf").expect("derive");
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_names_give_distinct_ids() {
        let a = derive_point_id("report.pdf").expect("derive");
        let b = derive_point_id("Report.pdf").expect("derive");
        let c = derive_point_id("report.pdf ").expect("derive");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_matches_uuid_v5_dns_namespace() {
        let expected = Uuid::new_v5(&Uuid::NAMESPACE_DNS, b"report.pdf");
        assert_eq!(
            derive_point_id("report.pdf").expect("derive"),
            PointId::Uuid(expected.to_string())
        );
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(matches!(
            derive_point_id(""),
            Err(AppError::Validation(_))
        ));
    }
}
