//! View-state controllers, one per feature. Each keeps its form state, the
//! last result and an inline error string; rendering is left to the caller.

pub mod auth;
pub mod documents;
pub mod doctor_portal;
pub mod interactions;
pub mod medications;
pub mod note_analyzer;
pub mod org_console;
pub mod overview;
pub mod patient_portal;
pub mod prescription;

pub use auth::AuthFlow;
pub use documents::DocumentVault;
pub use doctor_portal::DoctorPortal;
pub use interactions::InteractionChecker;
pub use medications::MedicationManager;
pub use note_analyzer::{NoteAnalyzer, NoteForm};
pub use org_console::OrgConsole;
pub use overview::{Overview, Stats, StatsTicker};
pub use patient_portal::{Notice, PatientPortal};
pub use prescription::PrescriptionScanner;

use crate::error::Result;

/// Mirrors a result into a controller's inline error slot and passes it on.
pub(crate) fn record<T>(slot: &mut Option<String>, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        *slot = Some(e.message());
    }
    result
}
