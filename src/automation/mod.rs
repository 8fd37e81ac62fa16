//! Turns timer fires into joins, recordings and notes.

pub mod collaborators;
pub mod error;
pub mod handle;
pub mod orchestrator;

pub use collaborators::{
    Collaborators, DeepLinkOpener, GeneratedActionItem, GeneratedNotes, NotesGenerator,
    RecordingController, Transcriber,
};
pub use error::AutomationError;
pub use handle::AutomationHandle;
pub use orchestrator::AutomationOrchestrator;
