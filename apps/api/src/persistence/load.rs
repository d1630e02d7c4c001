use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::editing::normalize;
use crate::models::{AppSettings, ResumeDocument, Theme};
use crate::persistence::store::KeyValueStore;
use crate::persistence::{RESUME_KEY, SETTINGS_KEY, THEME_KEY};

/// Session state restored at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredSession {
    pub document: ResumeDocument,
    pub settings: AppSettings,
    pub theme: Theme,
}

/// Loads each persisted key independently. A missing key, an unreadable store
/// or an unparsable value keeps that key's default; none of these is an error.
/// A restored document is normalized before use.
pub async fn load_session(store: &dyn KeyValueStore) -> RestoredSession {
    let document = read_json(store, RESUME_KEY)
        .await
        .map(normalize)
        .unwrap_or_else(ResumeDocument::sample);
    let settings = read_json(store, SETTINGS_KEY).await.unwrap_or_default();
    let theme = read_raw(store, THEME_KEY)
        .await
        .and_then(|raw| {
            let theme = Theme::from_token(&raw);
            if theme.is_none() {
                warn!("Ignoring stored theme '{raw}'");
            }
            theme
        })
        .unwrap_or_default();

    RestoredSession {
        document,
        settings,
        theme,
    }
}

async fn read_raw(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read '{key}' from store, using default: {e}");
            None
        }
    }
}

async fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = read_raw(store, key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => {
            info!("Restored '{key}' from store");
            Some(value)
        }
        Err(e) => {
            warn!("Stored '{key}' is not valid JSON for its shape, using default: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{settings::Template, Seniority};
    use crate::persistence::store::MemoryStore;

    #[tokio::test]
    async fn test_empty_store_yields_defaults() {
        let store = MemoryStore::new();
        let restored = load_session(&store).await;
        assert_eq!(restored.document.name, "Your Name");
        assert_eq!(restored.settings, AppSettings::default());
        assert_eq!(restored.theme, Theme::Light);
    }

    #[tokio::test]
    async fn test_keys_load_independently() {
        let store = MemoryStore::new();
        store.set(RESUME_KEY, "{not json").await.unwrap();
        store
            .set(SETTINGS_KEY, r#"{"seniority":"Lead","template":"modern"}"#)
            .await
            .unwrap();
        store.set(THEME_KEY, "dark").await.unwrap();

        let restored = load_session(&store).await;
        assert_eq!(restored.document.target_role, "Data Scientist");
        assert_eq!(restored.settings.seniority, Seniority::Lead);
        assert_eq!(restored.settings.template, Template::Modern);
        assert_eq!(restored.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_stored_document_is_restored() {
        let store = MemoryStore::new();
        let mut doc = ResumeDocument::sample();
        doc.name = "Ada Lovelace".into();
        store
            .set(RESUME_KEY, &serde_json::to_string(&doc).unwrap())
            .await
            .unwrap();

        let restored = load_session(&store).await;
        assert_eq!(restored.document, doc);
    }

    #[tokio::test]
    async fn test_restored_document_is_normalized() {
        let store = MemoryStore::new();
        let mut doc = ResumeDocument::sample();
        doc.experience[0].generations = (0..6).map(|i| vec![format!("v{i}")]).collect();
        doc.experience.push(doc.experience[0].clone());
        doc.skills.push("SQL".into());
        store
            .set(RESUME_KEY, &serde_json::to_string(&doc).unwrap())
            .await
            .unwrap();

        let restored = load_session(&store).await.document;
        assert_eq!(restored.experience[0].generations.len(), 3);
        assert_eq!(restored.experience[0].id, doc.experience[0].id);
        assert_ne!(restored.experience[1].id, doc.experience[0].id);
        assert_eq!(restored.skills, ResumeDocument::sample().skills);
    }

    #[tokio::test]
    async fn test_unknown_theme_falls_back_to_light() {
        let store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").await.unwrap();
        assert_eq!(load_session(&store).await.theme, Theme::Light);
    }
}
