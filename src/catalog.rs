//! Internship catalog loading.
//!
//! The catalog is populated once at startup, either from a CSV export or
//! from the built-in seed postings, and is read-only for the remainder of
//! the process lifetime. It is also the source of the deduplicated skill
//! and location vocabularies served by the API.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::matching::domain::{Internship, InternshipId, REMOTE};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog row {row} lists no required skills")]
    MissingSkills { row: usize },
    #[error("catalog contains no internships")]
    Empty,
}

/// Read-only internship catalog with id-based lookup.
#[derive(Debug)]
pub struct Catalog {
    internships: Vec<Internship>,
    by_id: HashMap<Uuid, usize>,
}

impl Catalog {
    pub fn from_internships(internships: Vec<Internship>) -> Result<Self, CatalogError> {
        if internships.is_empty() {
            return Err(CatalogError::Empty);
        }

        let by_id = internships
            .iter()
            .enumerate()
            .map(|(index, internship)| (internship.id.0, index))
            .collect();

        Ok(Self {
            internships,
            by_id,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut internships = Vec::new();
        for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            let row = record?;
            let skills = split_list(&row.skills);
            if skills.is_empty() {
                // header is row 1, first data row is 2
                return Err(CatalogError::MissingSkills { row: index + 2 });
            }

            internships.push(Internship {
                id: InternshipId::generate(),
                title: row.title,
                company: row.company,
                location: row.location,
                salary: row.salary,
                skills,
                description: row.description,
                sector: row.sector,
                apply_link: row.apply_link,
            });
        }

        Self::from_internships(internships)
    }

    pub fn internships(&self) -> &[Internship] {
        &self.internships
    }

    pub fn get(&self, id: &InternshipId) -> Option<&Internship> {
        self.by_id
            .get(&id.0)
            .map(|&index| &self.internships[index])
    }

    pub fn len(&self) -> usize {
        self.internships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.internships.is_empty()
    }

    /// Deduplicated, sorted vocabulary of required skills across the
    /// catalog. Duplicates are folded case-insensitively, first spelling
    /// wins.
    pub fn skills(&self) -> Vec<String> {
        dedup_sorted(
            self.internships
                .iter()
                .flat_map(|internship| internship.skills.iter()),
        )
    }

    /// Deduplicated, sorted vocabulary of posting locations.
    pub fn locations(&self) -> Vec<String> {
        dedup_sorted(self.internships.iter().map(|internship| &internship.location))
    }
}

fn dedup_sorted<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashMap::new();
    for value in values {
        seen.entry(value.to_lowercase()).or_insert_with(|| value.clone());
    }
    let mut out: Vec<String> = seen.into_values().collect();
    out.sort();
    out
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    title: String,
    company: String,
    location: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    salary: Option<String>,
    /// Semicolon-separated list of required skills.
    skills: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sector: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    apply_link: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

struct SeedTemplate {
    title: &'static str,
    company: &'static str,
    skills: &'static [&'static str],
    sector: &'static str,
    description: &'static str,
}

const SEED_TEMPLATES: &[SeedTemplate] = &[
    SeedTemplate {
        title: "Full Stack Developer Intern",
        company: "TechCorp Solutions",
        skills: &["JavaScript", "React", "Node.js", "MongoDB"],
        sector: "IT",
        description: "Build modern web applications using the MERN stack",
    },
    SeedTemplate {
        title: "Digital Marketing Specialist",
        company: "MarketPro Agency",
        skills: &["Digital Marketing", "SEO", "Content Writing", "Social Media Marketing"],
        sector: "Marketing",
        description: "Drive digital marketing campaigns and content strategy",
    },
    SeedTemplate {
        title: "UI/UX Designer",
        company: "Design Studio",
        skills: &["Adobe Photoshop", "Figma", "UI Design", "Wireframing"],
        sector: "Design",
        description: "Create intuitive user interfaces and user experiences",
    },
    SeedTemplate {
        title: "Data Analyst Intern",
        company: "DataTech Analytics",
        skills: &["Python", "Data Analysis", "Excel", "Statistics"],
        sector: "IT",
        description: "Analyze data trends and create business insights",
    },
    SeedTemplate {
        title: "Content Creator",
        company: "Media Hub",
        skills: &["Content Writing", "Video Editing", "Adobe Premiere Pro", "Copywriting"],
        sector: "Content",
        description: "Create engaging content across multiple platforms",
    },
    SeedTemplate {
        title: "Android Developer Intern",
        company: "MobileFirst Technologies",
        skills: &["Android", "Java", "Kotlin", "Flutter"],
        sector: "IT",
        description: "Develop mobile applications for the Android platform",
    },
    SeedTemplate {
        title: "Financial Analyst Trainee",
        company: "Finance Solutions Ltd",
        skills: &["Financial Modeling", "Excel", "Accounting", "Financial literacy"],
        sector: "Finance",
        description: "Support financial planning and analysis activities",
    },
    SeedTemplate {
        title: "Machine Learning Intern",
        company: "AI Innovations",
        skills: &["Machine Learning", "Python", "Data Science", "TensorFlow"],
        sector: "IT",
        description: "Build and deploy ML models for business solutions",
    },
    SeedTemplate {
        title: "Graphic Design Intern",
        company: "Creative Agency",
        skills: &["Adobe Illustrator", "Adobe Photoshop", "CorelDRAW", "Design Thinking"],
        sector: "Design",
        description: "Create visual designs for branding and marketing materials",
    },
    SeedTemplate {
        title: "Operations Management Trainee",
        company: "OpsCorp Industries",
        skills: &["Operations", "Project Management", "Excel", "Process Optimization"],
        sector: "Operations",
        description: "Support day-to-day operations and process improvements",
    },
];

const SEED_CITIES: &[&str] = &[
    "Bengaluru",
    "Mumbai",
    "Delhi",
    "Hyderabad",
    "Pune",
    "Chennai",
    "Ahmedabad",
    "Jaipur",
    "Lucknow",
    "Indore",
];

const SEED_STIPENDS: &[&str] = &[
    "₹8,000 - ₹15,000",
    "₹10,000 - ₹20,000",
    "₹12,000 - ₹25,000",
    "₹15,000 - ₹30,000",
];

/// Built-in catalog used when no CSV is supplied. Locations are assigned
/// round-robin from a fixed table, so the generated postings are identical
/// on every run apart from their generated ids.
pub fn seed() -> Catalog {
    let mut internships = Vec::new();

    for (index, template) in SEED_TEMPLATES.iter().enumerate() {
        let placements = [
            SEED_CITIES[index % SEED_CITIES.len()],
            SEED_CITIES[(index + 5) % SEED_CITIES.len()],
            REMOTE,
        ];

        for (slot, location) in placements.iter().enumerate() {
            internships.push(Internship {
                id: InternshipId::generate(),
                title: template.title.to_string(),
                company: template.company.to_string(),
                location: location.to_string(),
                salary: Some(SEED_STIPENDS[(index + slot) % SEED_STIPENDS.len()].to_string()),
                skills: template.skills.iter().map(|s| s.to_string()).collect(),
                description: Some(template.description.to_string()),
                sector: Some(template.sector.to_string()),
                apply_link: None,
            });
        }
    }

    Catalog::from_internships(internships).expect("seed catalog is never empty")
}
