//! Pushgateway pruner library exports

pub mod client;
pub mod config;
pub mod deleter;
pub mod error;
pub mod filter;
pub mod models;
pub mod parser;
pub mod pruner;
pub mod stats;
pub mod tasks;
pub mod telemetry;
