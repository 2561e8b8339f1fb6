use std::collections::HashSet;

use common::{error::AppError, storage::types::point::PointId};
use tracing::error;

use super::{
    report::{IngestionReport, IngestionRequest},
    services::PipelineServices,
};

pub struct PipelineContext<'a> {
    pub request: &'a IngestionRequest,
    pub services: &'a dyn PipelineServices,
    /// `None` when the size could not be determined; the check is skipped.
    pub vector_size: Option<u64>,
    pub existing: HashSet<PointId>,
    pub report: IngestionReport,
}

impl<'a> PipelineContext<'a> {
    pub fn new(request: &'a IngestionRequest, services: &'a dyn PipelineServices) -> Self {
        Self {
            request,
            services,
            vector_size: None,
            existing: HashSet::new(),
            report: IngestionReport::new(&request.collection, &request.tenant_id),
        }
    }

    pub fn collection(&self) -> &str {
        &self.request.collection
    }

    pub fn abort(&self, err: AppError) -> AppError {
        error!(
            collection = %self.request.collection,
            tenant_id = %self.request.tenant_id,
            error = %err,
            "ingestion run aborted"
        );
        err
    }
}
