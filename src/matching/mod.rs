//! Candidate-to-internship matching pipeline.
//!
//! `scoring` holds the deterministic rule-based scorer and hard-filter
//! predicates, `ranker` the external generative-model adapter, and
//! `service` the orchestrator that combines them with fallback semantics.

pub mod domain;
pub mod intake;
pub mod ranker;
pub mod repository;
pub mod router;
mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Candidate, CandidateFormData, CandidateId, EducationLevel, Internship, InternshipId,
    InternshipMatch, MatchResult, ANY_LOCATION, REMOTE,
};
pub use intake::{IntakeGuard, ValidationError};
pub use ranker::{GeminiRanker, MatchAssessment, RankedEntry, RankerError, ShortlistRanker};
pub use repository::{CandidateStore, MatchStore, MemoryStore, StoreError};
pub use router::matching_router;
pub use scoring::{passes_hard_filter, score, RuleScore};
pub use service::{MatchOutcome, MatchingConfig, MatchingError, MatchingService};
