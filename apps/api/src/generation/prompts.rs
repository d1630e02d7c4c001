// Prompt text for bullet generation.

use crate::generation::types::GenerationContext;

/// System prompt: JSON-only output.
pub const BULLETS_SYSTEM: &str = "You are an expert resume writer. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Replace: {target_role}, {seniority}, {tone}, {job_description},
///          {job_title}, {company}, {tech}, {notes}
pub const BULLETS_PROMPT_TEMPLATE: &str = r#"Generate 3-5 strong, metric-driven resume bullet points.

RESUME CONTEXT:
- Target Role: {target_role}
- Candidate Seniority: {seniority}
- Desired Tone: {tone}
- Target Job Description/Keywords: {job_description}

EXPERIENCE DETAILS:
- Job Title: {job_title}
- Company: {company}
- Key Technologies/Tools: {tech}
- Candidate's Raw Notes/Achievements: {notes}

INSTRUCTIONS:
1. Create 3 to 5 bullet points.
2. Each bullet must start with a strong, action-oriented verb.
3. Follow the STAR (Situation, Task, Action, Result) or CAR (Context, Action, Result) framework.
4. Quantify everything: percentages, dollar amounts, time saved, or scale (users, data volume).
5. If a metric is missing from the notes, infer a realistic, conservative placeholder and mark it with "(placeholder)". Example: "...increasing efficiency by 15% (placeholder)."
6. Tailor language and focus to the Target Role, Seniority, and Job Description.
7. Keep each bullet concise: 1-2 lines, under 30 words.
8. Do not use the first person (I, my, we).
9. Identify key technical skills or tools mentioned or implied and list them.

Return a JSON object with this EXACT schema:
{
  "bullets": ["An array of 3-5 resume bullet points"],
  "skills": ["An array of key skills identified from the experience"]
}"#;

pub fn build_bullet_prompt(ctx: &GenerationContext) -> String {
    let job_description = if ctx.job_description.trim().is_empty() {
        "Not provided"
    } else {
        ctx.job_description.as_str()
    };

    BULLETS_PROMPT_TEMPLATE
        .replace("{target_role}", &ctx.target_role)
        .replace("{seniority}", ctx.seniority.as_str())
        .replace("{tone}", ctx.tone.as_str())
        .replace("{job_description}", job_description)
        .replace("{job_title}", &ctx.experience.job_title)
        .replace("{company}", &ctx.experience.company)
        .replace("{tech}", &ctx.experience.tech.join(", "))
        .replace("{notes}", &ctx.experience.notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppSettings, ResumeDocument};

    #[test]
    fn test_prompt_fills_every_placeholder() {
        let doc = ResumeDocument::sample();
        let ctx = GenerationContext::new(&doc, &AppSettings::default(), &doc.experience[0]);
        let prompt = build_bullet_prompt(&ctx);
        assert!(prompt.contains("Target Role: Data Scientist"));
        assert!(prompt.contains("Candidate Seniority: Senior"));
        assert!(prompt.contains("Desired Tone: Impact-focused"));
        assert!(prompt.contains("Kubernetes, Python, SOC2, GCP, Terraform"));
        for placeholder in ["{target_role}", "{tech}", "{notes}", "{job_title}"] {
            assert!(!prompt.contains(placeholder), "{placeholder} left in prompt");
        }
    }

    #[test]
    fn test_blank_job_description_reads_not_provided() {
        let doc = ResumeDocument::sample();
        let settings = AppSettings {
            job_description: "   ".into(),
            ..AppSettings::default()
        };
        let prompt = build_bullet_prompt(&GenerationContext::new(&doc, &settings, &doc.experience[0]));
        assert!(prompt.contains("Job Description/Keywords: Not provided"));
    }
}
