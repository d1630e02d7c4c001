//! Bullet generators: the collaborator the session calls for AI bullets.
//!
//! `SessionController` holds an `Arc<dyn BulletGenerator>`, chosen at startup:
//! `LlmBulletGenerator` when an API key is configured, otherwise
//! `OfflineBulletGenerator`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::generation::prompts::{build_bullet_prompt, BULLETS_SYSTEM};
use crate::generation::types::{fallback_result, GenerationContext, GenerationResult};
use crate::llm_client::{LlmClient, LlmError};

/// Upper bound on bullets accepted from one generation.
pub const MAX_BULLETS: usize = 5;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("generator returned no usable bullets")]
    EmptyBullets,

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait BulletGenerator: Send + Sync {
    async fn generate(&self, ctx: &GenerationContext) -> Result<GenerationResult, GenerationError>;
}

/// Shape the model is asked to return.
#[derive(Debug, Deserialize)]
struct RawBullets {
    bullets: Vec<String>,
    #[serde(default)]
    skills: Vec<String>,
}

pub struct LlmBulletGenerator {
    llm: LlmClient,
}

impl LlmBulletGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl BulletGenerator for LlmBulletGenerator {
    async fn generate(&self, ctx: &GenerationContext) -> Result<GenerationResult, GenerationError> {
        let prompt = build_bullet_prompt(ctx);
        let raw: RawBullets = self.llm.complete_json(&prompt, BULLETS_SYSTEM).await?;
        debug!(
            entry_id = %ctx.experience.id,
            bullets = raw.bullets.len(),
            skills = raw.skills.len(),
            "LLM generation returned"
        );

        let bullets = clean_lines(raw.bullets, MAX_BULLETS);
        if bullets.is_empty() {
            return Err(GenerationError::EmptyBullets);
        }

        Ok(GenerationResult {
            bullets,
            skills: clean_lines(raw.skills, usize::MAX),
            is_fallback: false,
        })
    }
}

/// Always answers with the static fallback payload.
pub struct OfflineBulletGenerator;

#[async_trait]
impl BulletGenerator for OfflineBulletGenerator {
    async fn generate(&self, _ctx: &GenerationContext) -> Result<GenerationResult, GenerationError> {
        Ok(fallback_result())
    }
}

/// Trims every line, drops blanks, keeps at most `limit`.
fn clean_lines(lines: Vec<String>, limit: usize) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppSettings, ResumeDocument};

    #[test]
    fn test_clean_lines_trims_and_caps() {
        let lines = vec![
            "  one ".to_string(),
            "".to_string(),
            "two".to_string(),
            "   ".to_string(),
            "three".to_string(),
            "four".to_string(),
            "five".to_string(),
            "six".to_string(),
        ];
        assert_eq!(
            clean_lines(lines, MAX_BULLETS),
            vec!["one", "two", "three", "four", "five"]
        );
    }

    #[test]
    fn test_raw_bullets_tolerates_missing_skills() {
        let raw: RawBullets = serde_json::from_str(r#"{"bullets":["Shipped it"]}"#).unwrap();
        assert_eq!(raw.bullets, vec!["Shipped it"]);
        assert!(raw.skills.is_empty());
    }

    #[tokio::test]
    async fn test_offline_generator_returns_fallback() {
        let doc = ResumeDocument::sample();
        let ctx = GenerationContext::new(&doc, &AppSettings::default(), &doc.experience[0]);
        let result = OfflineBulletGenerator.generate(&ctx).await.unwrap();
        assert!(result.is_fallback);
        assert_eq!(result, fallback_result());
    }
}
