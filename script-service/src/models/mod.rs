//! Domain models for the script service.

pub mod script;

pub use script::{ScriptDocument, ScriptEdit};
