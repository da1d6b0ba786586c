//! Multi-step property wizard: step registry, fragments, validation, draft
//! storage, record assembly, and the controller that ties them together.

pub mod assembly;
pub mod controller;
pub mod draft;
pub mod engine;
pub mod fragments;
pub mod hydration;
pub mod preview;
pub mod registry;
pub mod validator;

pub use assembly::{assemble, PaymentMilestone, PropertyRecord, RecordDocument};
pub use controller::{
    StepOutcome, SubmissionOutcome, SubmissionTicket, WizardController, WizardMode, WizardPhase,
};
pub use draft::{Draft, DraftStore};
pub use engine::{
    StepView, WizardAction, WizardEngine, WizardInteraction, WizardNotice, WizardResult,
};
pub use fragments::{
    BankApprovalsFragment, BasicDetails, DocumentRef, DocumentsFragment, Fragment, ImageAsset,
    ImageSource, MediaFragment, Milestone, NearbyPlace, NearbyPlacesFragment, OwnerFragment,
    OwnerType, PricingFragment,
};
pub use hydration::{draft_from_server, HydrationAdapter};
pub use preview::{PreviewHandle, PreviewTracker};
pub use registry::{StepDescriptor, StepId, StepRegistry};
pub use validator::{validate, ValidationResult};
