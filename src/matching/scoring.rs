use super::domain::{Candidate, Internship, ANY_LOCATION};

const SKILLS_WEIGHT: f64 = 40.0;
const LOCATION_WEIGHT: f64 = 30.0;
const SECTOR_WEIGHT: f64 = 30.0;

/// Deterministic rule-based match for one candidate/internship pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleScore {
    pub percentage: u8,
    pub explanation: String,
}

/// Score one internship against a candidate. Pure and total: same inputs
/// always produce the same output, and no failure modes exist.
///
/// Three independently capped components: skills (40, proportional to the
/// share of candidate skills with at least one match), location (30,
/// binary) and sector (30, binary). The percentage keeps the
/// earned-over-possible division so the normalization survives component
/// changes even though the weights currently sum to 100.
pub fn score(candidate: &Candidate, internship: &Internship) -> RuleScore {
    let mut earned = 0.0;
    let mut possible = 0.0;

    let matching_skills = candidate
        .skills
        .iter()
        .filter(|skill| {
            internship
                .skills
                .iter()
                .any(|required| skill_matches(skill, required))
        })
        .count();
    earned += matching_skills as f64 / candidate.skills.len().max(1) as f64 * SKILLS_WEIGHT;
    possible += SKILLS_WEIGHT;

    let location_match = location_compatible(&candidate.locations, &internship.location);
    if location_match {
        earned += LOCATION_WEIGHT;
    }
    possible += LOCATION_WEIGHT;

    let sector_match = sector_aligned(&candidate.sectors, internship.sector.as_deref());
    if sector_match {
        earned += SECTOR_WEIGHT;
    }
    possible += SECTOR_WEIGHT;

    let percentage = (earned / possible * 100.0).round() as u8;

    let mut explanation = format!("This role matches {matching_skills} of your key skills");
    if location_match {
        explanation.push_str(" and aligns with your location preferences");
    }
    if sector_match {
        explanation.push_str(" in your preferred sector");
    }
    explanation.push_str(". It offers relevant experience for your career goals.");

    RuleScore {
        percentage,
        explanation,
    }
}

/// Hard-filter precondition: location compatibility plus at least one skill
/// overlap. An internship failing this never appears in results regardless
/// of how it would have scored.
pub fn passes_hard_filter(candidate: &Candidate, internship: &Internship) -> bool {
    location_compatible(&candidate.locations, &internship.location)
        && candidate.skills.iter().any(|skill| {
            internship
                .skills
                .iter()
                .any(|required| skill_matches(skill, required))
        })
}

/// Bidirectional case-insensitive substring test, so "react" matches
/// "React.js" and the reverse.
pub fn skill_matches(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Binary location rule shared by the scorer and the hard filter. The
/// `"Any Location"` sentinel admits everything; otherwise the internship's
/// literal location must appear in the candidate's preference set, which
/// covers `"Remote"` preferences matching remote postings.
pub fn location_compatible(candidate_locations: &[String], internship_location: &str) -> bool {
    candidate_locations
        .iter()
        .any(|preference| preference == ANY_LOCATION || preference == internship_location)
}

fn sector_aligned(candidate_sectors: &[String], internship_sector: Option<&str>) -> bool {
    let Some(sector) = internship_sector else {
        return false;
    };
    candidate_sectors
        .iter()
        .any(|interest| skill_matches(interest, sector))
}
