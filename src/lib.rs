pub mod backends;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod observability;
pub mod report;
pub mod runner;
pub mod timing;
