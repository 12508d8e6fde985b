use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;

use super::domain::{
    Candidate, CandidateFormData, CandidateId, Internship, InternshipMatch, MatchResult,
};
use super::intake::{IntakeGuard, ValidationError};
use super::ranker::ShortlistRanker;
use super::repository::{CandidateStore, MatchStore, StoreError};
use super::scoring::{self, RuleScore};

/// Pipeline bounds. The shortlist cap exists to bound external-call payload
/// size and latency; the result cap bounds the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingConfig {
    pub shortlist_threshold: u8,
    pub shortlist_cap: usize,
    pub result_cap: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            shortlist_threshold: 50,
            shortlist_cap: 20,
            result_cap: 10,
        }
    }
}

/// Result of a completed match request.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub candidate_id: CandidateId,
    pub matches: Vec<InternshipMatch>,
}

/// Error raised by the matching service. External-ranking failures never
/// appear here; they are recovered internally via the fallback path.
#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrator for the two-stage matching pipeline: hard filter, rule-based
/// shortlist, external ranking attempt, fallback, best-effort persistence.
pub struct MatchingService<S, K> {
    catalog: Arc<Catalog>,
    store: Arc<S>,
    ranker: Arc<K>,
    intake: IntakeGuard,
    config: MatchingConfig,
}

impl<S, K> MatchingService<S, K>
where
    S: CandidateStore + MatchStore + 'static,
    K: ShortlistRanker + 'static,
{
    pub fn new(catalog: Arc<Catalog>, store: Arc<S>, ranker: Arc<K>) -> Self {
        Self::with_config(catalog, store, ranker, MatchingConfig::default())
    }

    pub fn with_config(
        catalog: Arc<Catalog>,
        store: Arc<S>,
        ranker: Arc<K>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            ranker,
            intake: IntakeGuard,
            config,
        }
    }

    /// Process one candidate submission end to end. Once a shortlist
    /// exists the call always succeeds with a best-effort ranking; an
    /// empty eligible set is a normal empty response, not an error.
    pub async fn submit(&self, form: CandidateFormData) -> Result<MatchOutcome, MatchingError> {
        let candidate = self.intake.candidate_from_form(form)?;
        self.store.insert_candidate(candidate.clone())?;

        let shortlist = self.shortlist(&candidate);
        if shortlist.is_empty() {
            info!(candidate = %candidate.id, "no eligible internships after hard filter");
            return Ok(MatchOutcome {
                candidate_id: candidate.id,
                matches: Vec::new(),
            });
        }

        let shortlisted: Vec<Internship> = shortlist
            .iter()
            .map(|(internship, _)| (*internship).clone())
            .collect();

        let mut matches = match self.ranker.rank_shortlist(&candidate, &shortlisted).await {
            Ok(ranked) if !ranked.is_empty() => {
                debug!(
                    candidate = %candidate.id,
                    ranked = ranked.len(),
                    "external ranking succeeded"
                );
                ranked
            }
            Ok(_) => {
                info!(candidate = %candidate.id, "external ranking returned no entries, using rule-based ordering");
                fallback_matches(&shortlist)
            }
            Err(err) => {
                warn!(candidate = %candidate.id, error = %err, "external ranking failed, using rule-based ordering");
                fallback_matches(&shortlist)
            }
        };
        matches.truncate(self.config.result_cap);

        self.persist(&candidate.id, &matches);

        Ok(MatchOutcome {
            candidate_id: candidate.id,
            matches,
        })
    }

    /// Reconstruct previously returned matches from persisted records,
    /// joined against the live catalog. Records whose internship is no
    /// longer present are silently dropped.
    pub fn history(&self, candidate_id: &CandidateId) -> Result<Vec<InternshipMatch>, MatchingError> {
        let results = self.store.matches_for(candidate_id)?;
        Ok(results
            .into_iter()
            .filter_map(|result| {
                self.catalog
                    .get(&result.internship_id)
                    .map(|internship| InternshipMatch {
                        internship: internship.clone(),
                        match_percentage: result.match_percentage,
                        explanation: result.explanation,
                    })
            })
            .collect())
    }

    pub fn skills(&self) -> Vec<String> {
        self.catalog.skills()
    }

    pub fn locations(&self) -> Vec<String> {
        self.catalog.locations()
    }

    /// Hard filter plus rule-based scoring. Sorting is stable descending
    /// by score, so equal scores keep catalog order and the output stays
    /// reproducible.
    fn shortlist(&self, candidate: &Candidate) -> Vec<(&Internship, RuleScore)> {
        let mut shortlist: Vec<(&Internship, RuleScore)> = self
            .catalog
            .internships()
            .iter()
            .filter(|internship| scoring::passes_hard_filter(candidate, internship))
            .filter_map(|internship| {
                let score = scoring::score(candidate, internship);
                (score.percentage >= self.config.shortlist_threshold)
                    .then_some((internship, score))
            })
            .collect();

        shortlist.sort_by(|a, b| b.1.percentage.cmp(&a.1.percentage));
        shortlist.truncate(self.config.shortlist_cap);
        shortlist
    }

    /// Record the final set for later history lookups. Best-effort only: a
    /// write failure is logged and the response goes out regardless.
    fn persist(&self, candidate_id: &CandidateId, matches: &[InternshipMatch]) {
        for item in matches {
            let result = MatchResult {
                id: Uuid::new_v4(),
                candidate_id: *candidate_id,
                internship_id: item.internship.id,
                match_percentage: item.match_percentage,
                explanation: item.explanation.clone(),
                created_at: Utc::now(),
            };
            if let Err(err) = self.store.insert_match(result) {
                warn!(
                    candidate = %candidate_id,
                    internship = %item.internship.id,
                    error = %err,
                    "failed to persist match result"
                );
            }
        }
    }
}

fn fallback_matches(shortlist: &[(&Internship, RuleScore)]) -> Vec<InternshipMatch> {
    shortlist
        .iter()
        .map(|(internship, score)| InternshipMatch {
            internship: (*internship).clone(),
            match_percentage: score.percentage,
            explanation: score.explanation.clone(),
        })
        .collect()
}
