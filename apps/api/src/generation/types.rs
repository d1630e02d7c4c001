use serde::{Deserialize, Serialize};

use crate::models::{AppSettings, ExperienceEntry, ResumeDocument, Seniority, Tone};

/// The experience fields sent to the generator. History is deliberately not
/// part of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceContext {
    pub id: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub tech: Vec<String>,
    pub notes: String,
}

impl From<&ExperienceEntry> for ExperienceContext {
    fn from(entry: &ExperienceEntry) -> Self {
        Self {
            id: entry.id.clone(),
            job_title: entry.job_title.clone(),
            company: entry.company.clone(),
            location: entry.location.clone(),
            start_date: entry.start_date.clone(),
            end_date: entry.end_date.clone(),
            tech: entry.tech.clone(),
            notes: entry.notes.clone(),
        }
    }
}

/// Request sent to a `BulletGenerator` for one experience entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub target_role: String,
    pub seniority: Seniority,
    pub tone: Tone,
    pub job_description: String,
    pub experience: ExperienceContext,
}

impl GenerationContext {
    pub fn new(document: &ResumeDocument, settings: &AppSettings, entry: &ExperienceEntry) -> Self {
        Self {
            target_role: document.target_role.clone(),
            seniority: settings.seniority,
            tone: settings.tone,
            job_description: settings.job_description.clone(),
            experience: ExperienceContext::from(entry),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub bullets: Vec<String>,
    pub skills: Vec<String>,
    #[serde(default)]
    pub is_fallback: bool,
}

/// Static payload used when the generator is unavailable or fails.
pub fn fallback_result() -> GenerationResult {
    GenerationResult {
        bullets: vec![
            "Led a cross-functional team of 5 engineers to deliver a new feature set, increasing \
             user engagement by 20% (placeholder)."
                .to_string(),
            "Automated a critical data processing pipeline, reducing manual effort by 10 hours \
             per week and improving data accuracy."
                .to_string(),
            "Presented technical findings to senior leadership, influencing the strategic \
             decision to adopt a new technology stack."
                .to_string(),
        ],
        skills: vec![
            "Project Management".to_string(),
            "Automation".to_string(),
            "Public Speaking".to_string(),
        ],
        is_fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_omits_history() {
        let doc = ResumeDocument::sample();
        let ctx = GenerationContext::new(&doc, &AppSettings::default(), &doc.experience[0]);
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["targetRole"], "Data Scientist");
        assert_eq!(value["tone"], "Impact-focused");
        assert_eq!(value["experience"]["company"], "WNN Industries");
        assert!(value["experience"].get("bullets").is_none());
        assert!(value["experience"].get("generations").is_none());
    }

    #[test]
    fn test_fallback_is_tagged() {
        let fallback = fallback_result();
        assert!(fallback.is_fallback);
        assert_eq!(fallback.bullets.len(), 3);
        assert!(fallback.skills.contains(&"Automation".to_string()));
    }

    #[test]
    fn test_result_decodes_without_fallback_flag() {
        let result: GenerationResult =
            serde_json::from_str(r#"{"bullets":["a"],"skills":["b"]}"#).unwrap();
        assert!(!result.is_fallback);
    }
}
