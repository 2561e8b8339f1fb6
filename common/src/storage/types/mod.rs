pub mod collection;
pub mod collection_config;
pub mod distance;
pub mod payload;
pub mod point;
