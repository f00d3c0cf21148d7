// ABOUTME: Library root for stackline - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod facts;
pub mod graph;
pub mod namespace;
pub mod output;
pub mod provision;
pub mod types;
pub mod units;
