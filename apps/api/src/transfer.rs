//! JSON import/export of the whole session: `{ "resumeData": ..., "settings": ... }`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::editing::normalize;
use crate::models::{AppSettings, ResumeDocument};

pub const RESUME_DATA_FIELD: &str = "resumeData";
pub const SETTINGS_FIELD: &str = "settings";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is not valid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("missing required top-level key '{0}'")]
    MissingKey(&'static str),

    #[error("'{key}' does not match the expected shape: {source}")]
    InvalidShape {
        key: &'static str,
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportFile<'a> {
    resume_data: &'a ResumeDocument,
    settings: &'a AppSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSession {
    pub document: ResumeDocument,
    pub settings: AppSettings,
}

/// Pretty-printed export payload.
pub fn export_json(document: &ResumeDocument, settings: &AppSettings) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportFile {
        resume_data: document,
        settings,
    })
}

/// Suggested download name, e.g. `AI-Resume-Data-2024-05-01.json`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("AI-Resume-Data-{}.json", now.format("%Y-%m-%d"))
}

/// Parses an import file. Both top-level keys must be present; nothing is
/// returned unless the whole file decodes. The document comes back normalized:
/// history capped, skills de-duplicated, entry ids unique.
pub fn import_json(text: &str) -> Result<ImportedSession, ImportError> {
    let root: Value = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;
    import_value(root)
}

pub fn import_value(mut root: Value) -> Result<ImportedSession, ImportError> {
    let resume_data = take_key(&mut root, RESUME_DATA_FIELD)?;
    let settings = take_key(&mut root, SETTINGS_FIELD)?;

    Ok(ImportedSession {
        document: normalize(decode(RESUME_DATA_FIELD, resume_data)?),
        settings: decode(SETTINGS_FIELD, settings)?,
    })
}

fn take_key(root: &mut Value, key: &'static str) -> Result<Value, ImportError> {
    root.as_object_mut()
        .and_then(|map| map.remove(key))
        .filter(|value| !value.is_null())
        .ok_or(ImportError::MissingKey(key))
}

fn decode<T: serde::de::DeserializeOwned>(key: &'static str, value: Value) -> Result<T, ImportError> {
    serde_json::from_value(value).map_err(|source| ImportError::InvalidShape { key, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{settings::Template, Tone};
    use chrono::TimeZone;

    #[test]
    fn test_export_shape_and_pretty_print() {
        let doc = ResumeDocument::sample();
        let json = export_json(&doc, &AppSettings::default()).unwrap();
        assert!(json.contains('\n'), "export is pretty-printed");

        let value: Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(value["resumeData"]["name"], "Your Name");
        assert_eq!(value["settings"]["tone"], "Impact-focused");
    }

    #[test]
    fn test_export_then_import_restores_session() {
        let mut doc = ResumeDocument::sample();
        doc.experience[0].generations = vec![vec!["old".into()]];
        let settings = AppSettings {
            tone: Tone::Technical,
            template: Template::Modern,
            ..AppSettings::default()
        };
        let imported = import_json(&export_json(&doc, &settings).unwrap()).unwrap();
        assert_eq!(imported.document, doc);
        assert_eq!(imported.settings, settings);
    }

    #[test]
    fn test_import_requires_both_keys() {
        let err = import_json(r#"{"resumeData": {}}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingKey("settings")));

        let err = import_json(r#"{"settings": {}}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingKey("resumeData")));

        let err = import_json(r#"{"resumeData": null, "settings": {}}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingKey("resumeData")));

        let err = import_json("[1, 2]").unwrap_err();
        assert!(matches!(err, ImportError::MissingKey("resumeData")));
    }

    #[test]
    fn test_import_rejects_invalid_json_and_shapes() {
        assert!(matches!(
            import_json("{resumeData:"),
            Err(ImportError::InvalidJson(_))
        ));
        assert!(matches!(
            import_json(r#"{"resumeData": {"skills": "Rust"}, "settings": {}}"#),
            Err(ImportError::InvalidShape { key: "resumeData", .. })
        ));
        assert!(matches!(
            import_json(r#"{"resumeData": {}, "settings": {"tone": "Sarcastic"}}"#),
            Err(ImportError::InvalidShape { key: "settings", .. })
        ));
    }

    #[test]
    fn test_import_fills_missing_fields_with_defaults() {
        let imported =
            import_json(r#"{"resumeData": {"name": "Grace"}, "settings": {}}"#).unwrap();
        assert_eq!(imported.document.name, "Grace");
        assert!(imported.document.experience.is_empty());
        assert_eq!(imported.settings, AppSettings::default());
    }

    #[test]
    fn test_import_normalizes_document() {
        let text = r#"{
            "resumeData": {
                "skills": ["Go", "Rust", "Go"],
                "experience": [
                    {"id": "a", "generations": [["1"], ["2"], ["3"], ["4"], ["5"], ["6"]]},
                    {"id": "a"}
                ]
            },
            "settings": {}
        }"#;
        let imported = import_json(text).unwrap().document;
        assert_eq!(imported.skills, vec!["Go", "Rust"]);
        assert_eq!(imported.experience[0].generations.len(), 3);
        assert_eq!(imported.experience[0].generations[0], vec!["1"]);
        assert_eq!(imported.experience[0].id, "a");
        assert_ne!(imported.experience[1].id, "a");
    }

    #[test]
    fn test_export_file_name_uses_utc_date() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap();
        assert_eq!(export_file_name(now), "AI-Resume-Data-2024-05-01.json");
    }
}
