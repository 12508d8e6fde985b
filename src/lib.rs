//! Candidate-to-internship matching service.
//!
//! The core of the crate is the two-stage matching pipeline under
//! [`matching`]: a deterministic rule-based scorer shortlists internships
//! from the catalog, then an external generative-model ranker refines the
//! shortlist, falling back to the rule-based ordering whenever the external
//! call fails.

pub mod catalog;
pub mod config;
pub mod error;
pub mod matching;
pub mod telemetry;
