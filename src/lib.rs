pub mod config;
pub mod consolidate;
pub mod fetch_error;
pub mod fetcher;
pub mod pipeline;
pub mod series;
pub mod tables;
pub mod utils;
