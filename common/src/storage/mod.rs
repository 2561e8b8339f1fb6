#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod qdrant;
pub mod types;
pub mod vector_store;
