pub mod collections;
pub mod liveness;
pub mod readiness;
