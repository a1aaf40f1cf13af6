//! Infrastructure - configuration and run statistics
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults)
//! - `run_stats` - Per-run data quality counters

pub mod config;
pub mod run_stats;

// Re-export commonly used types
pub use config::Config;
pub use run_stats::RunStats;
