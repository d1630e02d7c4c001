//! Session controller: the single owner of editing state.
//!
//! The lock is held only while a pure transition runs. It is never held across
//! a generator call, so edits stay responsive while bullets are generated and
//! a finished generation applies to whatever the entry looks like by then
//! (last write wins).
//!
//! Generation runs on its own task. A caller that goes away (a dropped HTTP
//! request) does not cancel it: the result is still applied and the
//! in-flight flag is still cleared.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::editing::{self, merge_skills, record_and_replace, FieldPath};
use crate::errors::AppError;
use crate::generation::{
    fallback_result, BulletGenerator, GenerationContext, GenerationError, GenerationResult,
};
use crate::models::{
    AppSettings, EducationEntry, ExperienceEntry, ResumeDocument, Theme,
};
use crate::persistence::{PersistScheduler, RestoredSession};
use crate::transfer::{self, ImportedSession};

/// Flag shown in `generating` while a bulk generation runs.
pub const GENERATE_ALL_FLAG: &str = "all";
pub const FALLBACK_NOTICE: &str = "Offline mode: using sample bullets.";
pub const IMPORT_NOTICE: &str = "Data imported successfully.";

#[derive(Debug)]
struct SessionState {
    document: ResumeDocument,
    settings: AppSettings,
    theme: Theme,
    /// Entry ids (and `GENERATE_ALL_FLAG`) with a generation in flight,
    /// counted so overlapping requests for one id keep the flag until the
    /// last one finishes.
    generating: BTreeMap<String, usize>,
}

impl SessionState {
    fn mark_generating(&mut self, key: &str) {
        *self.generating.entry(key.to_string()).or_default() += 1;
    }

    fn unmark_generating(&mut self, key: &str) {
        if let Some(count) = self.generating.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.generating.remove(key);
            }
        }
    }
}

/// Read-only view of the whole session, as served to the front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub resume_data: ResumeDocument,
    pub settings: AppSettings,
    pub theme: Theme,
    pub generating: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub entry_id: String,
    /// The entry after the new bullets were recorded. `None` when the entry
    /// was removed while its request was in flight.
    pub entry: Option<ExperienceEntry>,
    pub skills: Vec<String>,
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAllOutcome {
    pub results: Vec<GenerationOutcome>,
    /// Ids captured at the start that were gone by their turn.
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub session: SessionView,
    pub notice: String,
}

struct Inner {
    state: Mutex<SessionState>,
    generator: Arc<dyn BulletGenerator>,
    persist: PersistScheduler,
    generation_timeout: Duration,
}

#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(
        restored: RestoredSession,
        generator: Arc<dyn BulletGenerator>,
        persist: PersistScheduler,
        generation_timeout: Duration,
    ) -> Self {
        let RestoredSession {
            document,
            settings,
            theme,
        } = restored;

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState {
                    document,
                    settings,
                    theme,
                    generating: BTreeMap::new(),
                }),
                generator,
                persist,
                generation_timeout,
            }),
        }
    }

    async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().await
    }

    fn schedule_save(&self, state: &SessionState) {
        self.inner
            .persist
            .schedule_save(&state.document, &state.settings);
    }

    pub async fn view(&self) -> SessionView {
        let state = self.lock().await;
        SessionView {
            resume_data: state.document.clone(),
            settings: state.settings.clone(),
            theme: state.theme,
            generating: state.generating.keys().cloned().collect(),
        }
    }

    #[cfg(test)]
    pub async fn document(&self) -> ResumeDocument {
        self.lock().await.document.clone()
    }

    // ── Field edits ────────────────────────────────────────────────────────

    /// Writes `value` at a dotted path inside the resume document.
    ///
    /// Entry ids are not editable; replacing a whole entry keeps its id. The
    /// result is normalized, so history stays capped and skills stay unique.
    pub async fn set_field(&self, path: &str, value: Value) -> Result<ResumeDocument, AppError> {
        let path = FieldPath::parse(path)?;
        editing::reject_entry_id_edit(&path)?;
        let mut state = self.lock().await;

        let mut updated = editing::path::set(&state.document, &path, value)?;
        editing::keep_entry_id(&state.document, &mut updated, &path);

        state.document = editing::normalize(updated);
        self.schedule_save(&state);
        Ok(state.document.clone())
    }

    pub async fn get_field(&self, path: &str) -> Result<Value, AppError> {
        let path = FieldPath::parse(path)?;
        let state = self.lock().await;
        Ok(editing::path::get(&state.document, &path)?)
    }

    /// Sets one top-level settings field, e.g. `tone` or `jobDescription`.
    pub async fn update_settings(&self, field: &str, value: Value) -> Result<AppSettings, AppError> {
        if field.contains('.') {
            return Err(AppError::Validation(format!(
                "settings field '{field}' must be a single name"
            )));
        }
        let path = FieldPath::parse(field)?;
        let mut state = self.lock().await;

        state.settings = editing::path::set(&state.settings, &path, value)?;
        self.schedule_save(&state);
        Ok(state.settings.clone())
    }

    // ── Entry lifecycle ────────────────────────────────────────────────────

    pub async fn add_experience(&self) -> ExperienceEntry {
        let entry = ExperienceEntry::default();
        let mut state = self.lock().await;
        state.document.experience.push(entry.clone());
        self.schedule_save(&state);
        info!(entry_id = %entry.id, "Added experience entry");
        entry
    }

    pub async fn remove_experience(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.lock().await;
        let before = state.document.experience.len();
        state.document.experience.retain(|e| e.id != id);
        if state.document.experience.len() == before {
            return Err(AppError::NotFound(format!("Experience {id} not found")));
        }
        self.schedule_save(&state);
        info!(entry_id = %id, "Removed experience entry");
        Ok(())
    }

    pub async fn add_education(&self) -> EducationEntry {
        let entry = EducationEntry::default();
        let mut state = self.lock().await;
        state.document.education.push(entry.clone());
        self.schedule_save(&state);
        info!(entry_id = %entry.id, "Added education entry");
        entry
    }

    pub async fn remove_education(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.lock().await;
        let before = state.document.education.len();
        state.document.education.retain(|e| e.id != id);
        if state.document.education.len() == before {
            return Err(AppError::NotFound(format!("Education {id} not found")));
        }
        self.schedule_save(&state);
        info!(entry_id = %id, "Removed education entry");
        Ok(())
    }

    // ── Generation ─────────────────────────────────────────────────────────

    /// Generates bullets for one experience entry.
    ///
    /// Generator failures never surface: the fallback payload is used instead
    /// and the outcome carries `FALLBACK_NOTICE`.
    pub async fn generate(&self, id: &str) -> Result<GenerationOutcome, AppError> {
        let this = self.clone();
        let id = id.to_string();
        tokio::spawn(async move { this.run_generation(&id).await })
            .await
            .map_err(|e| AppError::Internal(e.into()))?
    }

    async fn run_generation(&self, id: &str) -> Result<GenerationOutcome, AppError> {
        let ctx = {
            let mut state = self.lock().await;
            let entry = state
                .document
                .experience(id)
                .ok_or_else(|| AppError::NotFound(format!("Experience {id} not found")))?;
            let ctx = GenerationContext::new(&state.document, &state.settings, entry);
            state.mark_generating(id);
            ctx
        };

        let result = self.request_bullets(&ctx).await;

        let mut state = self.lock().await;
        state.unmark_generating(id);
        Ok(self.apply_generation(&mut state, id, result))
    }

    /// Generates for every experience entry, one request at a time.
    ///
    /// Entry ids are captured up front; an id that no longer exists when its
    /// turn comes is skipped.
    pub async fn generate_all(&self) -> Result<GenerateAllOutcome, AppError> {
        let this = self.clone();
        tokio::spawn(async move { this.run_generate_all().await })
            .await
            .map_err(|e| AppError::Internal(e.into()))
    }

    async fn run_generate_all(&self) -> GenerateAllOutcome {
        let ids: Vec<String> = {
            let mut state = self.lock().await;
            state.mark_generating(GENERATE_ALL_FLAG);
            state.document.experience.iter().map(|e| e.id.clone()).collect()
        };
        info!("Generating bullets for {} entries", ids.len());

        let mut results = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();

        for id in ids {
            match self.run_generation(&id).await {
                Ok(outcome) if outcome.entry.is_some() => results.push(outcome),
                Ok(_) => skipped.push(id),
                Err(e) => {
                    info!(entry_id = %id, "Skipping entry during bulk generation: {e}");
                    skipped.push(id);
                }
            }
        }

        self.lock().await.unmark_generating(GENERATE_ALL_FLAG);

        let notice = results
            .iter()
            .any(|r| r.is_fallback)
            .then(|| FALLBACK_NOTICE.to_string());

        GenerateAllOutcome {
            results,
            skipped,
            notice,
        }
    }

    async fn request_bullets(&self, ctx: &GenerationContext) -> GenerationResult {
        let timeout = self.inner.generation_timeout;
        let outcome = match tokio::time::timeout(timeout, self.inner.generator.generate(ctx)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(GenerationError::Timeout(timeout)),
        };

        match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    entry_id = %ctx.experience.id,
                    "Bullet generation failed, using fallback: {e}"
                );
                fallback_result()
            }
        }
    }

    fn apply_generation(
        &self,
        state: &mut SessionState,
        id: &str,
        result: GenerationResult,
    ) -> GenerationOutcome {
        let notice = result.is_fallback.then(|| FALLBACK_NOTICE.to_string());

        let Some(slot) = state.document.experience_mut(id) else {
            info!(entry_id = %id, "Entry removed while generating; discarding result");
            return GenerationOutcome {
                entry_id: id.to_string(),
                entry: None,
                skills: result.skills,
                is_fallback: result.is_fallback,
                notice,
            };
        };

        *slot = record_and_replace(slot, result.bullets);
        let entry = slot.clone();
        state.document.skills = merge_skills(&state.document.skills, &result.skills);
        self.schedule_save(state);

        info!(
            entry_id = %id,
            bullets = entry.bullets.len(),
            fallback = result.is_fallback,
            "Recorded new generation"
        );

        GenerationOutcome {
            entry_id: id.to_string(),
            entry: Some(entry),
            skills: result.skills,
            is_fallback: result.is_fallback,
            notice,
        }
    }

    /// Restores the previous bullet set of an entry. A no-op when its history
    /// is empty.
    pub async fn undo(&self, id: &str) -> Result<ExperienceEntry, AppError> {
        let mut state = self.lock().await;
        let slot = state
            .document
            .experience_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Experience {id} not found")))?;

        if !editing::can_undo(slot) {
            return Ok(slot.clone());
        }

        *slot = editing::undo(slot);
        let entry = slot.clone();
        self.schedule_save(&state);
        Ok(entry)
    }

    // ── Import / export / reset ────────────────────────────────────────────

    /// Replaces document and settings from an import file. A rejected file
    /// leaves the session untouched.
    pub async fn import(&self, text: &str) -> Result<ImportOutcome, AppError> {
        let ImportedSession { document, settings } = transfer::import_json(text)?;
        {
            let mut state = self.lock().await;
            state.document = document;
            state.settings = settings;
            self.schedule_save(&state);
        }
        info!("Imported session data");
        Ok(ImportOutcome {
            session: self.view().await,
            notice: IMPORT_NOTICE.to_string(),
        })
    }

    pub async fn export(&self) -> Result<String, AppError> {
        let state = self.lock().await;
        transfer::export_json(&state.document, &state.settings)
            .map_err(|e| AppError::Internal(e.into()))
    }

    /// Back to the sample resume and default settings; stored document and
    /// settings are removed. The theme is kept.
    pub async fn reset(&self) -> SessionView {
        {
            let mut state = self.lock().await;
            state.document = ResumeDocument::sample();
            state.settings = AppSettings::default();
            self.inner.persist.clear();
        }
        info!("Session reset to defaults");
        self.view().await
    }

    pub async fn toggle_theme(&self) -> Theme {
        let mut state = self.lock().await;
        state.theme = state.theme.toggled();
        self.inner.persist.save_theme(state.theme);
        state.theme
    }

    /// Writes anything still pending and stops the persistence writer.
    pub async fn shutdown(&self) {
        self.inner.persist.shutdown().await;
    }
}
