// The editing session: one controller owning the document, settings and theme.
// Pure editing functions compute each transition; the controller installs the
// result, triggers persistence and calls the bullet generator.

pub mod controller;

pub use controller::{
    GenerateAllOutcome, GenerationOutcome, ImportOutcome, SessionController, SessionView,
};
