pub mod collections;
pub mod config;
pub mod log;
pub mod preferences;
