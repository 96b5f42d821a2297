//! CV analysis reduction: turns the model's free-text analysis into a record.
//!
//! Default: `KeywordSectionReducer`, a keyword heuristic over blank-line sections.
//! It is brittle on unconventional layouts; callers always get the raw text too.
//!
//! `AiTools` holds an `Arc<dyn AnalysisReducer>` so a schema-constrained
//! backend can replace it without touching the orchestrator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    pub degree: String,
    pub institution: String,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub company: String,
    pub position: String,
    pub duration: Option<String>,
    pub achievements: Vec<String>,
}

/// Best-effort structured view of a CV analysis. Every field is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvAnalysisRecord {
    pub name: String,
    pub contact: ContactInfo,
    pub summary: String,
    pub total_experience_years: u32,
    pub skills: Vec<String>,
    pub education: Vec<EducationItem>,
    pub experience: Vec<ExperienceItem>,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
}

pub trait AnalysisReducer: Send + Sync {
    fn reduce(&self, raw: &str) -> CvAnalysisRecord;
}

pub struct KeywordSectionReducer;

impl AnalysisReducer for KeywordSectionReducer {
    fn reduce(&self, raw: &str) -> CvAnalysisRecord {
        reduce_cv_analysis(raw)
    }
}

/// Sections are separated by a blank line. The first rule that matches a
/// section wins; sections matching nothing are skipped.
pub fn reduce_cv_analysis(text: &str) -> CvAnalysisRecord {
    let mut record = CvAnalysisRecord::default();

    for section in text.split("\n\n") {
        let lower = section.to_lowercase();

        if lower.contains("name:") {
            record.name = colon_field(section);
        } else if lower.contains("email:") || lower.contains("phone:") {
            for line in section.lines() {
                let line_lower = line.to_lowercase();
                if line_lower.contains("email:") {
                    record.contact.email = Some(colon_field(line));
                }
                if line_lower.contains("phone:") {
                    record.contact.phone = Some(colon_field(line));
                }
            }
        } else if lower.contains("summary") || lower.contains("objective") {
            record.summary = after_first_colon(section).trim().to_string();
        } else if lower.contains("skills") {
            record.skills = after_first_colon(section)
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }

    record
}

/// Text between the first and second colon, trimmed.
fn colon_field(text: &str) -> String {
    text.split(':').nth(1).unwrap_or_default().trim().to_string()
}

/// Everything after the first colon, or nothing when there is no colon.
fn after_first_colon(text: &str) -> &str {
    text.split_once(':').map(|(_, rest)| rest).unwrap_or_default()
}
