use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Similarity metric of a collection's vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceMetric {
    Euclidean,
    Cosine,
    DotProduct,
}

/// Local name, store name, accepted aliases.
const METRIC_TABLE: [(DistanceMetric, &str, &str, &[&str]); 3] = [
    (
        DistanceMetric::Euclidean,
        "EUCLIDEAN",
        "Euclid",
        &["euclidean", "euclid"],
    ),
    (DistanceMetric::Cosine, "COSINE", "Cosine", &["cosine"]),
    (
        DistanceMetric::DotProduct,
        "DOT_PRODUCT",
        "Dot",
        &["dot_product", "dot"],
    ),
];

impl DistanceMetric {
    pub const ALL: [DistanceMetric; 3] = [Self::Euclidean, Self::Cosine, Self::DotProduct];

    fn entry(self) -> (&'static str, &'static str) {
        METRIC_TABLE
            .iter()
            .find(|(metric, ..)| *metric == self)
            .map_or(("COSINE", "Cosine"), |(_, name, store, _)| (*name, *store))
    }

    pub fn name(self) -> &'static str {
        self.entry().0
    }

    /// The value the vector store expects in `vectors.distance`.
    pub fn as_store_value(self) -> &'static str {
        self.entry().1
    }

    pub fn from_store_value(value: &str) -> Option<Self> {
        METRIC_TABLE
            .iter()
            .find(|(_, _, store, _)| *store == value)
            .map(|(metric, ..)| *metric)
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DistanceMetric.{}", self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        METRIC_TABLE
            .iter()
            .find(|(_, _, _, aliases)| aliases.contains(&lowered.as_str()))
            .map(|(metric, ..)| *metric)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "unknown distance metric '{s}'. Expected one of EUCLIDEAN, COSINE, DOT_PRODUCT"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_local_and_store_names() {
        assert_eq!("COSINE".parse::<DistanceMetric>().ok(), Some(DistanceMetric::Cosine));
        assert_eq!("Cosine".parse::<DistanceMetric>().ok(), Some(DistanceMetric::Cosine));
        assert_eq!(
            "EUCLIDEAN".parse::<DistanceMetric>().ok(),
            Some(DistanceMetric::Euclidean)
        );
        assert_eq!("Euclid".parse::<DistanceMetric>().ok(), Some(DistanceMetric::Euclidean));
        assert_eq!(
            "dot_product".parse::<DistanceMetric>().ok(),
            Some(DistanceMetric::DotProduct)
        );
        assert_eq!("Dot".parse::<DistanceMetric>().ok(), Some(DistanceMetric::DotProduct));
    }

    #[test]
    fn test_parse_rejects_unknown_metric() {
        let err = "MANHATTAN".parse::<DistanceMetric>().expect_err("should reject");
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("MANHATTAN")));
    }

    #[test]
    fn test_store_mapping_round_trips() {
        for metric in DistanceMetric::ALL {
            assert_eq!(
                DistanceMetric::from_store_value(metric.as_store_value()),
                Some(metric)
            );
        }
        assert_eq!(DistanceMetric::Euclidean.as_store_value(), "Euclid");
        assert_eq!(DistanceMetric::DotProduct.as_store_value(), "Dot");
    }

    #[test]
    fn test_display_matches_response_wording() {
        assert_eq!(DistanceMetric::Cosine.to_string(), "DistanceMetric.COSINE");
        assert_eq!(
            DistanceMetric::DotProduct.to_string(),
            "DistanceMetric.DOT_PRODUCT"
        );
    }
}
