use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::Catalog;
use crate::matching::domain::{
    Candidate, CandidateFormData, CandidateId, Internship, InternshipId, InternshipMatch,
    MatchResult, ANY_LOCATION,
};
use crate::matching::ranker::{RankerError, ShortlistRanker};
use crate::matching::repository::{CandidateStore, MatchStore, MemoryStore, StoreError};
use crate::matching::service::MatchingService;

pub(super) fn internship(
    title: &str,
    skills: &[&str],
    sector: Option<&str>,
    location: &str,
) -> Internship {
    Internship {
        id: InternshipId::generate(),
        title: title.to_string(),
        company: "Acme".to_string(),
        location: location.to_string(),
        salary: Some("₹10,000 - ₹20,000".to_string()),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        description: None,
        sector: sector.map(|s| s.to_string()),
        apply_link: None,
    }
}

pub(super) fn finance_catalog() -> Arc<Catalog> {
    Arc::new(
        Catalog::from_internships(vec![
            internship(
                "Financial Analyst Trainee",
                &["Python", "Excel"],
                Some("Finance"),
                "Mumbai",
            ),
            internship("Accounts Intern", &["Excel"], Some("Finance"), "Mumbai"),
            internship("Reporting Intern", &["Python"], None, "Mumbai"),
            internship("Knitting Assistant", &["Knitting"], None, "Mumbai"),
        ])
        .expect("catalog builds"),
    )
}

pub(super) fn form() -> CandidateFormData {
    CandidateFormData {
        full_name: "Asha Verma".to_string(),
        email: "asha@example.com".to_string(),
        education: "undergraduate".to_string(),
        skills: vec!["Python".to_string(), "Excel".to_string()],
        sectors: vec!["Finance".to_string()],
        locations: vec![ANY_LOCATION.to_string()],
        language: Some("en".to_string()),
    }
}

/// Scripted stand-in for the external ranking call.
pub(super) enum RankerBehavior {
    /// Fail with a transport error, as a timeout would.
    Fail,
    /// Succeed with an empty result set.
    Empty,
    /// Return the shortlist reversed with descending scripted percentages,
    /// so tests can tell model order from rule-based order.
    Reverse,
}

pub(super) struct ScriptedRanker {
    pub behavior: RankerBehavior,
}

#[async_trait]
impl ShortlistRanker for ScriptedRanker {
    async fn rank_shortlist(
        &self,
        _candidate: &Candidate,
        shortlist: &[Internship],
    ) -> Result<Vec<InternshipMatch>, RankerError> {
        match self.behavior {
            RankerBehavior::Fail => Err(RankerError::Transport("scripted failure".to_string())),
            RankerBehavior::Empty => Ok(Vec::new()),
            RankerBehavior::Reverse => Ok(shortlist
                .iter()
                .rev()
                .enumerate()
                .map(|(index, internship)| InternshipMatch {
                    internship: internship.clone(),
                    match_percentage: 99 - index as u8,
                    explanation: format!("Model pick #{}", index + 1),
                })
                .collect()),
        }
    }
}

/// Ranker that records how many internships it was handed before failing
/// over to the rule-based path, so tests can observe the shortlist bound.
#[derive(Default)]
pub(super) struct ShortlistSizeRanker {
    pub seen: AtomicUsize,
}

#[async_trait]
impl ShortlistRanker for ShortlistSizeRanker {
    async fn rank_shortlist(
        &self,
        _candidate: &Candidate,
        shortlist: &[Internship],
    ) -> Result<Vec<InternshipMatch>, RankerError> {
        self.seen.store(shortlist.len(), Ordering::SeqCst);
        Err(RankerError::Transport("scripted failure".to_string()))
    }
}

/// Store whose match writes always fail, for best-effort persistence tests.
#[derive(Default)]
pub(super) struct FlakyMatchStore {
    inner: MemoryStore,
}

impl CandidateStore for FlakyMatchStore {
    fn insert_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        self.inner.insert_candidate(candidate)
    }

    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, StoreError> {
        self.inner.candidate(id)
    }
}

impl MatchStore for FlakyMatchStore {
    fn insert_match(&self, _result: MatchResult) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("scripted write failure".to_string()))
    }

    fn matches_for(&self, candidate: &CandidateId) -> Result<Vec<MatchResult>, StoreError> {
        self.inner.matches_for(candidate)
    }
}

pub(super) fn service_with(
    catalog: Arc<Catalog>,
    behavior: RankerBehavior,
) -> MatchingService<MemoryStore, ScriptedRanker> {
    MatchingService::new(
        catalog,
        Arc::new(MemoryStore::default()),
        Arc::new(ScriptedRanker { behavior }),
    )
}
