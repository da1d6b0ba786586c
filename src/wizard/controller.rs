//! Wizard state machine.
//!
//! The controller is the only writer of its draft. It moves through
//! `AtStep(0..N)`, then `Submitting`, and ends in `Completed` or `Failed`.
//! `Failed` keeps the pointer on the last step with the draft intact, so the
//! user can retry or walk back to fix earlier steps.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    api::{ApiEnvelope, PropertyApi},
    errors::{ApiError, WizardError, GENERIC_ERROR_MESSAGE},
};

use super::assembly::PropertyRecord;
use super::draft::{Draft, DraftStore};
use super::fragments::{Fragment, OwnerFragment, OwnerType};
use super::preview::PreviewTracker;
use super::registry::{StepDescriptor, StepId, StepRegistry};
use super::validator::{self, ValidationResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit { record_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    AtStep(usize),
    Submitting,
    Completed,
    Failed,
}

/// Proof of the single submission in flight.
///
/// Carries the assembled record so the caller can hand it to the persistence
/// API; resolved through [`WizardController::finish_submission`].
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    id: Uuid,
    mode: WizardMode,
    record: PropertyRecord,
    started_at: DateTime<Utc>,
}

impl SubmissionTicket {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn record(&self) -> &PropertyRecord {
        &self.record
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// Fragment accepted and the pointer moved forward.
    Advanced { from: StepId, to: StepId },
    /// Fragment failed validation; nothing was stored.
    Rejected(ValidationResult),
    /// Last step accepted; the record awaits persistence.
    Submitting(SubmissionTicket),
    /// Persistence succeeded with the server's `data`.
    Completed(Option<Value>),
    /// Persistence failed; the message is shown verbatim.
    SubmissionFailed(String),
    /// Input arrived while a submission was in flight.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Completed(Option<Value>),
    Failed(String),
}

#[derive(Debug)]
pub struct WizardController {
    registry: StepRegistry,
    mode: WizardMode,
    store: DraftStore,
    phase: WizardPhase,
    last_error: Option<ValidationResult>,
    failure: Option<String>,
    in_flight: Option<Uuid>,
    generic_message: String,
}

impl WizardController {
    /// Create-mode wizard starting at the owner-type step.
    pub fn create(previews: PreviewTracker) -> Self {
        let registry = StepRegistry::create_flow();
        let store = DraftStore::new(&registry, previews);
        Self::from_parts(registry, WizardMode::Create, store)
    }

    /// Edit-mode wizard seeded with a hydrated draft.
    pub fn edit(
        record_id: impl Into<String>,
        draft: Draft,
        previews: PreviewTracker,
    ) -> Result<Self, WizardError> {
        let registry = StepRegistry::edit_flow();
        let store = DraftStore::from_draft(&registry, draft, previews)?;
        Ok(Self::from_parts(
            registry,
            WizardMode::Edit {
                record_id: record_id.into(),
            },
            store,
        ))
    }

    /// Wizard over a custom registry with an empty draft.
    pub fn with_registry(registry: StepRegistry, mode: WizardMode, previews: PreviewTracker) -> Self {
        let store = DraftStore::new(&registry, previews);
        Self::from_parts(registry, mode, store)
    }

    fn from_parts(registry: StepRegistry, mode: WizardMode, store: DraftStore) -> Self {
        tracing::debug!(flow = registry.name(), steps = registry.len(), "wizard opened");
        Self {
            registry,
            mode,
            store,
            phase: WizardPhase::AtStep(0),
            last_error: None,
            failure: None,
            in_flight: None,
            generic_message: GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// Overrides the message shown when a collaborator fails without one.
    pub fn with_generic_message(mut self, message: impl Into<String>) -> Self {
        self.generic_message = message.into();
        self
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn step_count(&self) -> usize {
        self.registry.len()
    }

    fn last_index(&self) -> usize {
        self.registry.len().saturating_sub(1)
    }

    /// Pointer into the registry; never exceeds the number of steps.
    pub fn current_step_index(&self) -> usize {
        match self.phase {
            WizardPhase::AtStep(index) => index,
            WizardPhase::Submitting | WizardPhase::Failed => self.last_index(),
            WizardPhase::Completed => self.registry.len(),
        }
    }

    pub fn current_step(&self) -> Option<&StepDescriptor> {
        match self.phase {
            WizardPhase::Completed => None,
            _ => self.registry.step_at(self.current_step_index()),
        }
    }

    /// What the current step's form should show: its stored fragment or its
    /// empty shape.
    pub fn current_fragment(&self) -> Option<Fragment> {
        self.current_step().map(|step| self.store.get(step.id))
    }

    pub fn last_error(&self) -> Option<&ValidationResult> {
        self.last_error.as_ref()
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == WizardPhase::Submitting
    }

    pub fn draft(&self) -> &Draft {
        self.store.draft()
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    /// Record as it would be persisted now. Safe on partial drafts.
    pub fn assemble(&self) -> PropertyRecord {
        self.store.assemble()
    }

    // Ok(None) means the input must be ignored because a submission is in flight.
    fn active_index(&self) -> Result<Option<usize>, WizardError> {
        match self.phase {
            WizardPhase::AtStep(index) => Ok(Some(index)),
            WizardPhase::Failed => Ok(Some(self.last_index())),
            WizardPhase::Submitting => {
                tracing::warn!("submission already in flight, input ignored");
                Ok(None)
            }
            WizardPhase::Completed => Err(WizardError::NotAccepting(
                "the wizard has already completed".into(),
            )),
        }
    }

    fn descriptor_at(&self, index: usize) -> Result<StepDescriptor, WizardError> {
        self.registry
            .step_at(index)
            .copied()
            .ok_or_else(|| WizardError::NotAccepting("the wizard has no steps".into()))
    }

    /// Validates and stores the current step's fragment, then advances or,
    /// on the last step, starts the submission.
    pub fn submit_step(&mut self, fragment: Fragment) -> Result<StepOutcome, WizardError> {
        let Some(index) = self.active_index()? else {
            return Ok(StepOutcome::Ignored);
        };
        let descriptor = self.descriptor_at(index)?;
        if fragment.step() != descriptor.id {
            return Err(WizardError::FragmentMismatch {
                expected: descriptor.id,
                found: fragment.step(),
            });
        }

        let result = validator::validate(descriptor.id, &fragment);
        if !result.valid {
            tracing::warn!(step = %descriptor.id, errors = result.errors.len(), "step rejected");
            self.last_error = Some(result.clone());
            return Ok(StepOutcome::Rejected(result));
        }
        self.commit(index, fragment)
    }

    /// Owner-type selection: a closed choice that stores and advances at once.
    pub fn choose_owner(&mut self, owner: OwnerType) -> Result<StepOutcome, WizardError> {
        let Some(index) = self.active_index()? else {
            return Ok(StepOutcome::Ignored);
        };
        let descriptor = self.descriptor_at(index)?;
        if descriptor.id != StepId::OwnerType {
            return Err(WizardError::FragmentMismatch {
                expected: descriptor.id,
                found: StepId::OwnerType,
            });
        }
        self.commit(
            index,
            Fragment::OwnerType(OwnerFragment {
                owner_type: Some(owner),
            }),
        )
    }

    fn commit(&mut self, index: usize, fragment: Fragment) -> Result<StepOutcome, WizardError> {
        let from = fragment.step();
        self.store.merge(fragment)?;
        self.last_error = None;
        self.failure = None;

        match self.registry.step_at(index + 1) {
            Some(next) => {
                self.phase = WizardPhase::AtStep(index + 1);
                tracing::debug!(from = %from, to = %next.id, "wizard advanced");
                Ok(StepOutcome::Advanced { from, to: next.id })
            }
            None => Ok(StepOutcome::Submitting(self.begin_submission())),
        }
    }

    fn begin_submission(&mut self) -> SubmissionTicket {
        let ticket = SubmissionTicket {
            id: Uuid::new_v4(),
            mode: self.mode.clone(),
            record: self.store.assemble(),
            started_at: Utc::now(),
        };
        self.in_flight = Some(ticket.id);
        self.phase = WizardPhase::Submitting;
        tracing::info!(ticket = %ticket.id, flow = self.registry.name(), "submission started");
        ticket
    }

    /// Resubmits the current draft after a failed submission.
    pub fn retry(&mut self) -> Result<StepOutcome, WizardError> {
        match self.phase {
            WizardPhase::Failed => {
                self.failure = None;
                Ok(StepOutcome::Submitting(self.begin_submission()))
            }
            WizardPhase::Submitting => Ok(StepOutcome::Ignored),
            _ => Err(WizardError::NotAccepting(
                "nothing to retry, no submission has failed".into(),
            )),
        }
    }

    /// Moves to the previous step without re-validating. Returns whether the
    /// pointer moved; at the first step this is a no-op.
    pub fn back(&mut self) -> bool {
        let target = match self.phase {
            WizardPhase::AtStep(index) if index > 0 => index - 1,
            WizardPhase::Failed if self.last_index() > 0 => self.last_index() - 1,
            _ => return false,
        };
        self.phase = WizardPhase::AtStep(target);
        self.last_error = None;
        self.failure = None;
        tracing::debug!(to = target, "wizard moved back");
        true
    }

    /// Resolves the in-flight submission with the persistence result.
    pub fn finish_submission(
        &mut self,
        ticket_id: Uuid,
        result: Result<ApiEnvelope<Value>, ApiError>,
    ) -> Result<SubmissionOutcome, WizardError> {
        self.ensure_in_flight(ticket_id)?;
        self.in_flight = None;

        let outcome = match result {
            Ok(envelope) if envelope.success => SubmissionOutcome::Completed(envelope.data),
            Ok(envelope) => SubmissionOutcome::Failed(envelope.failure_message_or(&self.generic_message)),
            Err(err) => SubmissionOutcome::Failed(self.describe(&err)),
        };

        match &outcome {
            SubmissionOutcome::Completed(_) => {
                self.phase = WizardPhase::Completed;
                self.store.discard();
                tracing::info!(ticket = %ticket_id, "submission completed");
            }
            SubmissionOutcome::Failed(message) => {
                self.phase = WizardPhase::Failed;
                self.failure = Some(message.clone());
                tracing::warn!(ticket = %ticket_id, error = %message, "submission failed");
            }
        }
        Ok(outcome)
    }

    /// Hands the ticket's record to `api` (create or update by mode) and
    /// resolves the submission.
    pub fn persist<P: PropertyApi + ?Sized>(
        &mut self,
        ticket: &SubmissionTicket,
        api: &P,
    ) -> Result<SubmissionOutcome, WizardError> {
        self.ensure_in_flight(ticket.id)?;
        let result = match &ticket.mode {
            WizardMode::Create => api.create(&ticket.record),
            WizardMode::Edit { record_id } => api.update(record_id, &ticket.record),
        };
        self.finish_submission(ticket.id, result)
    }

    /// Completes a `Submitting` outcome through `api`; other outcomes pass through.
    pub fn settle<P: PropertyApi + ?Sized>(
        &mut self,
        outcome: StepOutcome,
        api: &P,
    ) -> Result<StepOutcome, WizardError> {
        match outcome {
            StepOutcome::Submitting(ticket) => Ok(match self.persist(&ticket, api)? {
                SubmissionOutcome::Completed(data) => StepOutcome::Completed(data),
                SubmissionOutcome::Failed(message) => StepOutcome::SubmissionFailed(message),
            }),
            other => Ok(other),
        }
    }

    /// [`submit_step`](Self::submit_step) followed by [`settle`](Self::settle).
    pub fn submit_and_persist<P: PropertyApi + ?Sized>(
        &mut self,
        fragment: Fragment,
        api: &P,
    ) -> Result<StepOutcome, WizardError> {
        let outcome = self.submit_step(fragment)?;
        self.settle(outcome, api)
    }

    /// Drops the wizard without persisting anything; previews are released.
    pub fn abandon(mut self) {
        self.store.discard();
        tracing::info!(flow = self.registry.name(), "wizard abandoned");
    }

    fn ensure_in_flight(&self, ticket_id: Uuid) -> Result<(), WizardError> {
        if self.phase == WizardPhase::Submitting && self.in_flight == Some(ticket_id) {
            Ok(())
        } else {
            Err(WizardError::StaleTicket(ticket_id))
        }
    }

    fn describe(&self, err: &ApiError) -> String {
        match err {
            ApiError::Rejected(message) if message.trim().is_empty() => self.generic_message.clone(),
            ApiError::Decode(_) => self.generic_message.clone(),
            other => other.user_message(),
        }
    }
}
