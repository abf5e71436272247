pub mod audit;
pub mod config;
pub mod logging;
pub mod monitor;
pub mod parser;
pub mod report;
pub mod version;
