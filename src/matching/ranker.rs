//! External ranking adapter for the Gemini `generateContent` API.
//!
//! The adapter owns the request contracts, the prompt construction, and the
//! validation gate applied to the model's structured output. Two call modes
//! exist with distinct response contracts: [`GeminiRanker::score_match`]
//! expects a single assessment object, [`ShortlistRanker::rank_shortlist`]
//! expects an array of ranked entries. Every invocation is all-or-nothing:
//! the adapter never retries and never returns partial rankings.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RankerConfig;

use super::domain::{Candidate, Internship, InternshipMatch};

/// Number of required skills included per internship in the ranking prompt,
/// to bound payload size.
const PROMPT_SKILL_CAP: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum RankerError {
    #[error("ranking request failed: {0}")]
    Transport(String),
    #[error("ranking service returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("ranking service returned an empty response")]
    EmptyResponse,
    #[error("ranking service returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// Single-match assessment contract. Returned by the single-object call
/// mode only; the batch mode uses [`RankedEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAssessment {
    pub match_percentage: f64,
    pub explanation: String,
}

/// One element of the batch-ranking response contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub internship_id: String,
    pub match_percentage: f64,
    pub explanation: String,
}

/// Seam between the orchestrator and the external ranking call, so the
/// pipeline can be exercised with scripted implementations.
#[async_trait]
pub trait ShortlistRanker: Send + Sync {
    /// Rank a shortlist of at most ~20 internships for a candidate,
    /// returning matches in descending match quality. Any network,
    /// timeout, or validation failure is a single typed error.
    async fn rank_shortlist(
        &self,
        candidate: &Candidate,
        shortlist: &[Internship],
    ) -> Result<Vec<InternshipMatch>, RankerError>;
}

/// Gemini-backed ranker. The request timeout is set on the underlying
/// client, so a timed-out call surfaces as a transport error like any
/// other failure.
pub struct GeminiRanker {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiRanker {
    pub fn new(config: &RankerConfig) -> Result<Self, RankerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| RankerError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Score a single candidate/internship pair. Expects the single-object
    /// response contract.
    pub async fn score_match(
        &self,
        candidate: &Candidate,
        internship: &Internship,
    ) -> Result<MatchAssessment, RankerError> {
        // single-match prompts carry the candidate's language so the model
        // can localize the explanation; the batch prompt omits it
        let prompt = format!(
            "{}\n- Language: {}\n{}\n\nAnalyze this match and provide your assessment.",
            candidate_profile_block(candidate),
            candidate.language.as_deref().unwrap_or("en"),
            internship_detail_block(internship),
        );

        let text = self.generate(SINGLE_MATCH_SYSTEM_PROMPT, &prompt).await?;

        let assessment: MatchAssessment = serde_json::from_str(&text)
            .map_err(|err| RankerError::MalformedResponse(err.to_string()))?;

        if !percentage_in_bounds(assessment.match_percentage) {
            return Err(RankerError::MalformedResponse(format!(
                "match percentage {} outside [0,100]",
                assessment.match_percentage
            )));
        }
        if assessment.explanation.trim().len() <= 10 {
            return Err(RankerError::MalformedResponse(
                "explanation missing or too short".to_string(),
            ));
        }

        Ok(assessment)
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<String, RankerError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: system.to_string(),
                }],
            }),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| RankerError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RankerError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(RankerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| RankerError::MalformedResponse(err.to_string()))?;

        let text = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(RankerError::EmptyResponse)?;

        Ok(text)
    }
}

#[async_trait]
impl ShortlistRanker for GeminiRanker {
    async fn rank_shortlist(
        &self,
        candidate: &Candidate,
        shortlist: &[Internship],
    ) -> Result<Vec<InternshipMatch>, RankerError> {
        let prompt = format!(
            "{}\n\nInternship Opportunities:{}\n\nAnalyze and rank these internships for the candidate.",
            candidate_profile_block(candidate),
            shortlist_block(shortlist),
        );

        let text = self.generate(BATCH_RANKING_SYSTEM_PROMPT, &prompt).await?;

        let entries: Vec<RankedEntry> = serde_json::from_str(&text)
            .map_err(|err| RankerError::MalformedResponse(err.to_string()))?;

        Ok(join_entries(entries, shortlist))
    }
}

/// Validate ranked entries against the shortlist that was actually sent.
/// The model is untrusted: entries naming unknown ids, repeating an id,
/// carrying an out-of-range percentage, or missing an explanation are
/// dropped individually. The survivors are re-sorted descending as a
/// safety net; the sort is stable, so model order still breaks ties.
fn join_entries(entries: Vec<RankedEntry>, shortlist: &[Internship]) -> Vec<InternshipMatch> {
    let by_id: HashMap<String, &Internship> = shortlist
        .iter()
        .map(|internship| (internship.id.to_string(), internship))
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut matches = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(internship) = by_id.get(&entry.internship_id) else {
            debug!(id = %entry.internship_id, "dropping ranked entry for unknown internship");
            continue;
        };
        if !percentage_in_bounds(entry.match_percentage) {
            debug!(id = %entry.internship_id, "dropping ranked entry with out-of-range percentage");
            continue;
        }
        if entry.explanation.trim().is_empty() {
            debug!(id = %entry.internship_id, "dropping ranked entry with blank explanation");
            continue;
        }
        if !seen.insert(entry.internship_id.clone()) {
            continue;
        }

        matches.push(InternshipMatch {
            internship: (*internship).clone(),
            match_percentage: entry.match_percentage.round() as u8,
            explanation: entry.explanation,
        });
    }

    matches.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
    matches
}

fn percentage_in_bounds(value: f64) -> bool {
    value.is_finite() && (0.0..=100.0).contains(&value)
}

fn candidate_profile_block(candidate: &Candidate) -> String {
    format!(
        "Candidate Profile:\n\
         - Education: {}\n\
         - Skills: {}\n\
         - Sector Interests: {}\n\
         - Location Preferences: {}",
        candidate.education.label(),
        candidate.skills.join(", "),
        candidate.sectors.join(", "),
        candidate.locations.join(", "),
    )
}

fn internship_detail_block(internship: &Internship) -> String {
    format!(
        "Internship Details:\n\
         - Title: {}\n\
         - Company: {}\n\
         - Location: {}\n\
         - Required Skills: {}\n\
         - Sector: {}\n\
         - Salary: {}\n\
         - Description: {}",
        internship.title,
        internship.company,
        internship.location,
        internship.skills.join(", "),
        internship.sector.as_deref().unwrap_or("Not specified"),
        internship.salary.as_deref().unwrap_or("Not specified"),
        internship.description.as_deref().unwrap_or("Not provided"),
    )
}

fn shortlist_block(shortlist: &[Internship]) -> String {
    shortlist
        .iter()
        .enumerate()
        .map(|(index, internship)| {
            let skills: Vec<&str> = internship
                .skills
                .iter()
                .take(PROMPT_SKILL_CAP)
                .map(String::as_str)
                .collect();
            format!(
                "\n{}. ID: {}\n   Title: {}\n   Company: {}\n   Location: {}\n   Required Skills: {}\n   Sector: {}",
                index + 1,
                internship.id,
                internship.title,
                internship.company,
                internship.location,
                skills.join(", "),
                internship.sector.as_deref().unwrap_or("General"),
            )
        })
        .collect()
}

const SINGLE_MATCH_SYSTEM_PROMPT: &str = "\
You are an expert career counselor and internship matching specialist.

Your task is to analyze a candidate's profile against an internship opportunity and provide:
1. A match percentage (0-100) based on skill overlap, location compatibility, education level, and sector alignment
2. A detailed explanation of why this internship is suitable for the candidate

Scoring Guidelines:
- Skills match (40%): How well candidate's skills align with required skills
- Location compatibility (25%): Geographic preference alignment or remote work options
- Education level (20%): Whether candidate meets education requirements
- Sector interest (15%): How well the internship aligns with candidate's sector preferences

Be honest about match quality but focus on positive aspects and potential.
Respond with JSON in this exact format:
{\"matchPercentage\": number, \"explanation\": string}";

const BATCH_RANKING_SYSTEM_PROMPT: &str = "\
You are an expert career counselor and internship matching specialist.

Your task is to analyze a candidate's profile against multiple internship opportunities and rank them by match quality.

For each internship, provide:
1. A match percentage (0-100) based on skill overlap, location compatibility, education level, and sector alignment
2. A concise explanation (max 100 characters) of why this internship matches

Scoring Guidelines:
- Skills match (40%): How well candidate's skills align with required skills
- Location compatibility (25%): Geographic preference alignment or remote work options
- Education level (20%): Whether candidate meets education requirements
- Sector interest (15%): How well the internship aligns with candidate's sector preferences

Return results sorted by match percentage in descending order.
Respond with JSON array in this exact format:
[{\"internshipId\": \"string\", \"matchPercentage\": number, \"explanation\": \"string\"}]";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<Content>,
}
