use super::domain::{Candidate, CandidateFormData, CandidateId, EducationLevel};

/// Validation errors raised by the intake guard. Surfaced as client errors
/// before any matching work begins.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("full name must not be blank")]
    BlankName,
    #[error("'{0}' is not a plausible email address")]
    InvalidEmail(String),
    #[error("unknown education level '{0}'")]
    UnknownEducation(String),
    #[error("at least one skill is required")]
    NoSkills,
    #[error("at least one location preference is required")]
    NoLocations,
}

/// Guard responsible for producing immutable [`Candidate`] profiles from
/// raw form submissions.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Validate and normalize a form submission. Entries are trimmed and
    /// blank list items dropped before the emptiness checks run.
    pub fn candidate_from_form(
        &self,
        form: CandidateFormData,
    ) -> Result<Candidate, ValidationError> {
        let full_name = form.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(ValidationError::BlankName);
        }

        let email = form.email.trim().to_string();
        if !plausible_email(&email) {
            return Err(ValidationError::InvalidEmail(email));
        }

        let education = EducationLevel::parse(&form.education)
            .ok_or_else(|| ValidationError::UnknownEducation(form.education.clone()))?;

        let skills = cleaned(form.skills);
        if skills.is_empty() {
            return Err(ValidationError::NoSkills);
        }

        let locations = cleaned(form.locations);
        if locations.is_empty() {
            return Err(ValidationError::NoLocations);
        }

        let language = form
            .language
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Candidate {
            id: CandidateId::generate(),
            full_name,
            email,
            education,
            skills,
            sectors: cleaned(form.sectors),
            locations,
            language,
        })
    }
}

fn cleaned(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn plausible_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
