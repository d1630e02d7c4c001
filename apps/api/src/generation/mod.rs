// Bullet generation collaborator: request/response types, prompt, generators.
// All LLM calls go through llm_client.

pub mod generator;
pub mod prompts;
pub mod types;

pub use generator::{BulletGenerator, GenerationError, LlmBulletGenerator, OfflineBulletGenerator};
pub use types::{fallback_result, GenerationContext, GenerationResult};
