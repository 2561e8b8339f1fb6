use std::collections::HashSet;

use common::{
    error::AppError,
    storage::{
        types::{payload::TenantId, point::PointId},
        vector_store::VectorStore,
    },
};
use tracing::debug;

/// Collects the ids of every point in `collection` owned by `tenant`,
/// following scroll pages until the store reports no further offset.
pub async fn list_existing(
    store: &dyn VectorStore,
    collection: &str,
    tenant: &TenantId,
    page_size: u32,
) -> Result<HashSet<PointId>, AppError> {
    let mut ids = HashSet::new();
    let mut seen_offsets = HashSet::new();
    let mut offset = None;
    let mut pages: u32 = 0;

    loop {
        let page = store
            .scroll_tenant_points(collection, tenant, page_size.max(1), offset)
            .await?;
        pages = pages.saturating_add(1);
        ids.extend(page.ids);

        match page.next_page_offset {
            Some(next) => {
                if !seen_offsets.insert(next.clone()) {
                    return Err(AppError::Store {
                        status: 500,
                        message: format!("scroll returned offset {next} twice"),
                    });
                }
                offset = Some(next);
            }
            None => break,
        }
    }

    debug!(
        collection = %collection,
        tenant_id = %tenant,
        existing = ids.len(),
        pages,
        "Listed existing points"
    );
    Ok(ids)
}
