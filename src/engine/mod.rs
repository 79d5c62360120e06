//! Estimation engine.
//!
//! - `prompt`: builds the LLM prompt from the procedure guidance table.
//! - `normalizer`: turns untrusted LLM JSON into an `EstimateResult`.
//! - `cache`: bounded memo cache with pluggable eviction.
//! - `estimator`: ties the three together behind a shared, locked cache.

pub mod cache;
pub mod estimator;
pub mod normalizer;
pub mod prompt;
