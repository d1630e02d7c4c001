use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a fresh opaque entry id.
pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub location: String,
}

/// A single work experience together with its bullet undo history.
///
/// `generations` is ordered most-recent-first and never holds more than
/// `editing::history::MAX_GENERATIONS` bullet sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub id: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    /// Free-form, usually "YYYY-MM".
    pub start_date: String,
    /// Free-form, "YYYY-MM" or "Present".
    pub end_date: String,
    pub tech: Vec<String>,
    pub notes: String,
    pub bullets: Vec<String>,
    pub generations: Vec<Vec<String>>,
}

impl Default for ExperienceEntry {
    fn default() -> Self {
        Self {
            id: new_entry_id(),
            job_title: String::new(),
            company: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            tech: Vec::new(),
            notes: String::new(),
            bullets: Vec::new(),
            generations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for EducationEntry {
    fn default() -> Self {
        Self {
            id: new_entry_id(),
            institution: String::new(),
            degree: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }
}

/// Root aggregate of the editing session. Field names serialize in camelCase,
/// which is also the vocabulary of edit paths (`experience.0.jobTitle`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub name: String,
    pub target_role: String,
    pub contact: Contact,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
}

impl ResumeDocument {
    /// The sample resume a new session starts from.
    pub fn sample() -> Self {
        Self {
            name: "Your Name".to_string(),
            target_role: "Data Scientist".to_string(),
            contact: Contact {
                email: "your.email@example.com".to_string(),
                phone: "(555) 123-4567".to_string(),
                location: "City, State".to_string(),
            },
            skills: strings(&[
                "Python",
                "SQL",
                "Tableau",
                "Scikit-learn",
                "TensorFlow",
                "PyTorch",
                "GCP",
                "Airflow",
            ]),
            experience: vec![ExperienceEntry {
                job_title: "AI Engineer".to_string(),
                company: "WNN Industries".to_string(),
                location: "Remote".to_string(),
                start_date: "2023-01".to_string(),
                end_date: "Present".to_string(),
                tech: strings(&["Kubernetes", "Python", "SOC2", "GCP", "Terraform"]),
                notes: "Led the development of a new fraud detection model. Also worked on \
                        migrating our services to a new cloud provider and improved system \
                        observability."
                    .to_string(),
                bullets: strings(&[
                    "Spearheaded the development and deployment of a novel machine learning model \
                     for fraud detection, resulting in a 15% reduction in false positives and an \
                     estimated $1.2M annual savings.",
                    "Orchestrated the migration of 3 core microservices to Google Cloud Platform \
                     (GCP) using Terraform and Kubernetes, improving system uptime by 25% and \
                     reducing infrastructure costs by 20%.",
                    "Enhanced system observability by implementing a comprehensive monitoring and \
                     alerting stack with Prometheus and Grafana, decreasing mean time to \
                     resolution (MTTR) for production incidents by 40%.",
                ]),
                ..ExperienceEntry::default()
            }],
            education: vec![EducationEntry {
                institution: "University of Technology".to_string(),
                degree: "M.S. in Computer Science".to_string(),
                location: "Metropolis, USA".to_string(),
                start_date: "2021-09".to_string(),
                end_date: "2022-12".to_string(),
                ..EducationEntry::default()
            }],
        }
    }

    pub fn experience(&self, id: &str) -> Option<&ExperienceEntry> {
        self.experience.iter().find(|e| e.id == id)
    }

    pub fn experience_mut(&mut self, id: &str) -> Option<&mut ExperienceEntry> {
        self.experience.iter_mut().find(|e| e.id == id)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_decode_to_defaults() {
        let doc: ResumeDocument = serde_json::from_str(
            r#"{"name": "Ada", "experience": [{"jobTitle": "Engineer"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.name, "Ada");
        assert!(doc.skills.is_empty());
        assert_eq!(doc.experience[0].job_title, "Engineer");
        assert!(
            !doc.experience[0].id.is_empty(),
            "entries without an id get a fresh one"
        );
        assert!(doc.experience[0].generations.is_empty());
    }

    #[test]
    fn test_serializes_camel_case_field_names() {
        let value = serde_json::to_value(ResumeDocument::sample()).unwrap();
        assert!(value.get("targetRole").is_some());
        assert!(value["experience"][0].get("jobTitle").is_some());
        assert!(value["education"][0].get("startDate").is_some());
    }

    #[test]
    fn test_sample_entries_get_distinct_ids() {
        let a = ResumeDocument::sample();
        let b = ResumeDocument::sample();
        assert_ne!(a.experience[0].id, b.experience[0].id);
        assert_ne!(a.experience[0].id, a.education[0].id);
    }

    #[test]
    fn test_lookup_experience_by_id() {
        let doc = ResumeDocument::sample();
        let id = doc.experience[0].id.clone();
        assert_eq!(
            doc.experience(&id).map(|e| e.company.as_str()),
            Some("WNN Industries")
        );
        assert!(doc.experience("missing").is_none());
    }
}
