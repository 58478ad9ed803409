pub mod adapters;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod storage;
pub mod telemetry;

pub use config::AppConfig;
