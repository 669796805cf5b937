//! surveyrules-core — Contingency and calculated-formula engine.
//!
//! Flat per-question declarations are expanded into their transitive
//! closure (with cycle detection) and then evaluated against respondent
//! data to decide question visibility and derived numeric answers.

pub mod contingency;
pub mod engine;
pub mod error;
pub mod formula;
pub mod model;
pub mod parser;

pub use engine::{AssessmentEngine, AssessmentOutcome};
pub use error::CycleError;
