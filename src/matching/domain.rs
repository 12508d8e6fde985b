use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Candidate preference value that matches every internship location.
pub const ANY_LOCATION: &str = "Any Location";
/// Location value shared by candidate preferences and remote postings.
pub const REMOTE: &str = "Remote";

/// Identifier wrapper for stored candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub Uuid);

impl CandidateId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier wrapper for catalog internships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InternshipId(pub Uuid);

impl InternshipId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InternshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Education tiers recognized by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    BelowSecondary,
    Undergraduate,
    Postgraduate,
}

impl EducationLevel {
    /// Parse a free-text education field, tolerating separator variants.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "below_secondary" => Some(Self::BelowSecondary),
            "undergraduate" => Some(Self::Undergraduate),
            "postgraduate" => Some(Self::Postgraduate),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EducationLevel::BelowSecondary => "below-secondary",
            EducationLevel::Undergraduate => "undergraduate",
            EducationLevel::Postgraduate => "postgraduate",
        }
    }
}

/// Raw submission body for `POST /api/matches`, validated by the intake
/// guard before any matching work begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFormData {
    pub full_name: String,
    pub email: String,
    pub education: String,
    pub skills: Vec<String>,
    pub sectors: Vec<String>,
    pub locations: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Validated candidate profile. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub full_name: String,
    pub email: String,
    pub education: EducationLevel,
    pub skills: Vec<String>,
    pub sectors: Vec<String>,
    pub locations: Vec<String>,
    pub language: Option<String>,
}

/// One catalog posting. Created at catalog-load time and read-only for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Internship {
    pub id: InternshipId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub skills: Vec<String>,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub apply_link: Option<String>,
}

/// Persisted record tying a returned match to its candidate. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub id: Uuid,
    pub candidate_id: CandidateId,
    pub internship_id: InternshipId,
    pub match_percentage: u8,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

/// The unit the orchestrator produces and API callers consume. Not stored
/// as such; reconstructed from [`MatchResult`] records for history lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipMatch {
    pub internship: Internship,
    pub match_percentage: u8,
    pub explanation: String,
}
