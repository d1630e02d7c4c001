use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seniority {
    Intern,
    Entry,
    Mid,
    #[default]
    Senior,
    Lead,
    Manager,
    Director,
}

impl Seniority {
    #[cfg(test)]
    pub const ALL: [Seniority; 7] = [
        Seniority::Intern,
        Seniority::Entry,
        Seniority::Mid,
        Seniority::Senior,
        Seniority::Lead,
        Seniority::Manager,
        Seniority::Director,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Intern => "Intern",
            Seniority::Entry => "Entry",
            Seniority::Mid => "Mid",
            Seniority::Senior => "Senior",
            Seniority::Lead => "Lead",
            Seniority::Manager => "Manager",
            Seniority::Director => "Director",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired writing tone for generated bullets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Concise,
    Confident,
    #[default]
    #[serde(rename = "Impact-focused")]
    ImpactFocused,
    Technical,
    Leadership,
}

impl Tone {
    #[cfg(test)]
    pub const ALL: [Tone; 5] = [
        Tone::Concise,
        Tone::Confident,
        Tone::ImpactFocused,
        Tone::Technical,
        Tone::Leadership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Concise => "Concise",
            Tone::Confident => "Confident",
            Tone::ImpactFocused => "Impact-focused",
            Tone::Technical => "Technical",
            Tone::Leadership => "Leadership",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual template selection. Rendering itself happens in the front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Professional,
    Modern,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub seniority: Seniority,
    pub tone: Tone,
    pub job_description: String,
    pub template: Template,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// The bare token stored under the `theme` key.
    pub fn as_token(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}
