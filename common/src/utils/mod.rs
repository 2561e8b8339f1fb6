pub mod config;
pub mod embedding;
