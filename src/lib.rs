pub mod condition;
pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod fetch_error;
pub mod fetcher;
pub mod locator;
pub mod orchestrator;
pub mod region;
pub mod store;
pub mod timestamp;
pub mod units;
