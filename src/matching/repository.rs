use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::domain::{Candidate, CandidateId, MatchResult};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for candidate profiles so the orchestrator can be
/// exercised in isolation and a durable backing store substituted later.
pub trait CandidateStore: Send + Sync {
    fn insert_candidate(&self, candidate: Candidate) -> Result<(), StoreError>;
    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, StoreError>;
}

/// Append-only storage for completed match results.
pub trait MatchStore: Send + Sync {
    fn insert_match(&self, result: MatchResult) -> Result<(), StoreError>;
    fn matches_for(&self, candidate: &CandidateId) -> Result<Vec<MatchResult>, StoreError>;
}

/// In-memory store backing both traits. No durability guarantees; both
/// maps are append-only, so a read lock is enough for every lookup.
#[derive(Debug, Default)]
pub struct MemoryStore {
    candidates: RwLock<HashMap<Uuid, Candidate>>,
    results: RwLock<Vec<MatchResult>>,
}

impl CandidateStore for MemoryStore {
    fn insert_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        let mut candidates = self
            .candidates
            .write()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        if candidates.contains_key(&candidate.id.0) {
            return Err(StoreError::Conflict);
        }
        candidates.insert(candidate.id.0, candidate);
        Ok(())
    }

    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, StoreError> {
        let candidates = self
            .candidates
            .read()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(candidates.get(&id.0).cloned())
    }
}

impl MatchStore for MemoryStore {
    fn insert_match(&self, result: MatchResult) -> Result<(), StoreError> {
        let mut results = self
            .results
            .write()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        results.push(result);
        Ok(())
    }

    fn matches_for(&self, candidate: &CandidateId) -> Result<Vec<MatchResult>, StoreError> {
        let results = self
            .results
            .read()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(results
            .iter()
            .filter(|result| result.candidate_id == *candidate)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::domain::{EducationLevel, InternshipId};
    use chrono::Utc;

    fn candidate() -> Candidate {
        Candidate {
            id: CandidateId::generate(),
            full_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            education: EducationLevel::Undergraduate,
            skills: vec!["Python".to_string()],
            sectors: Vec::new(),
            locations: vec!["Pune".to_string()],
            language: None,
        }
    }

    fn result_for(candidate_id: CandidateId, percentage: u8) -> MatchResult {
        MatchResult {
            id: Uuid::new_v4(),
            candidate_id,
            internship_id: InternshipId::generate(),
            match_percentage: percentage,
            explanation: "stored match".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn candidate_round_trips() {
        let store = MemoryStore::default();
        let candidate = candidate();
        store
            .insert_candidate(candidate.clone())
            .expect("insert succeeds");
        let fetched = store
            .candidate(&candidate.id)
            .expect("fetch succeeds")
            .expect("record present");
        assert_eq!(fetched, candidate);
    }

    #[test]
    fn duplicate_candidate_insert_conflicts() {
        let store = MemoryStore::default();
        let candidate = candidate();
        store
            .insert_candidate(candidate.clone())
            .expect("first insert succeeds");
        assert!(matches!(
            store.insert_candidate(candidate),
            Err(StoreError::Conflict)
        ));
    }

    #[test]
    fn unknown_candidate_is_none() {
        let store = MemoryStore::default();
        assert!(store
            .candidate(&CandidateId::generate())
            .expect("fetch succeeds")
            .is_none());
    }

    #[test]
    fn match_results_keep_insertion_order_per_candidate() {
        let store = MemoryStore::default();
        let ours = CandidateId::generate();
        let theirs = CandidateId::generate();

        store.insert_match(result_for(ours, 90)).expect("insert");
        store.insert_match(result_for(theirs, 85)).expect("insert");
        store.insert_match(result_for(ours, 70)).expect("insert");

        let results = store.matches_for(&ours).expect("fetch succeeds");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].match_percentage, 90);
        assert_eq!(results[1].match_percentage, 70);
    }
}
