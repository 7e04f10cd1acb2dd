//! Conference creation/edit wizard.
//!
//! - [`WizardState`]: step navigation and completion tracking
//! - [`DeleteTracker`]: persisted sub-entities removed while editing
//! - [`DraftLists`]: ticket/session/policy/... entries held by the step screens
//! - [`WizardSession`]: ties the above to a [`ConferenceGateway`]

pub mod delete_tracker;
pub mod draft;
pub mod gateway;
pub mod session;
pub mod state;
pub mod steps;

pub use delete_tracker::{DeleteCategory, DeleteTracker};
pub use draft::{
    DraftData, DraftEntry, DraftList, DraftLists, MediaDraft, PolicyDraft, RefundPolicyDraft,
    ResearchEntryDraft, SessionDraft, SponsorDraft, TicketDraft,
};
pub use gateway::{
    ConferenceGateway, LoadedConference, RecordingGateway, SaveAllRequest, StepSaveRequest,
    StepSaveResponse,
};
pub use session::{StepOutcome, WizardSession};
pub use state::{WizardMode, WizardState};
pub use steps::{step_title, validate_step, ConferenceKind, TechnicalStep};
