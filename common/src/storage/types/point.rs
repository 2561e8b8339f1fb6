use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payload::Payload;

/// Identifier of a stored point. The store accepts unsigned integers and
/// UUID strings; this system only writes UUIDs but reads both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl From<Uuid> for PointId {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value.hyphenated().to_string())
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Uuid(s) => f.write_str(s),
        }
    }
}

/// A point as written by the ingestion workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub id: PointId,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

/// One page of point ids returned by a tenant-scoped scroll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollPage {
    pub ids: Vec<PointId>,
    pub next_page_offset: Option<PointId>,
}
