//! MEDCOST — LLM-backed medical procedure cost estimates
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod llm;
pub mod engine;
pub mod server;
