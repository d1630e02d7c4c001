pub mod resume;
pub mod settings;

pub use resume::{EducationEntry, ExperienceEntry, ResumeDocument};
pub use settings::{AppSettings, Seniority, Theme, Tone};
