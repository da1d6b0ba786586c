//! Drives a [`WizardController`] through a [`WizardInteraction`].
//!
//! The presentation layer implements [`WizardInteraction`] to supply the next
//! user action for the step on screen and to show notices. The engine loops
//! until the record is persisted or the user abandons the wizard.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{api::PropertyApi, errors::WizardError};

use super::controller::{StepOutcome, WizardController};
use super::fragments::{Fragment, OwnerType};
use super::registry::{StepDescriptor, StepId};
use super::validator::ValidationResult;

/// One user action against the step on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardAction {
    Submit(Fragment),
    ChooseOwner(OwnerType),
    Back,
    Retry,
    Abandon,
}

/// Feedback for the presentation layer after each action.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardNotice {
    Advanced { to: StepId },
    Rejected { step: StepId, errors: ValidationResult },
    MovedBack { to: StepId },
    AlreadyAtFirstStep,
    SubmissionFailed(String),
    Completed,
    Ignored,
    /// The action does not apply to the current state; the draft is kept.
    NotAvailable(String),
}

/// Data provided to render the current step.
pub struct StepView<'a> {
    pub descriptor: &'a StepDescriptor,
    pub index: usize,
    pub total: usize,
    pub fragment: Fragment,
    pub last_error: Option<&'a ValidationResult>,
    pub failure: Option<&'a str>,
}

pub trait WizardInteraction {
    fn next_action(&mut self, view: &StepView<'_>) -> WizardAction;

    fn report(&mut self, _notice: &WizardNotice) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardResult {
    Completed(Option<Value>),
    Abandoned,
}

pub struct WizardEngine<'a, P: PropertyApi + ?Sized> {
    api: &'a P,
}

impl<'a, P: PropertyApi + ?Sized> WizardEngine<'a, P> {
    pub fn new(api: &'a P) -> Self {
        Self { api }
    }

    pub fn run<I: WizardInteraction>(
        &self,
        mut controller: WizardController,
        interaction: &mut I,
    ) -> Result<WizardResult, WizardError> {
        loop {
            let action = {
                let Some(descriptor) = controller.current_step() else {
                    return Err(WizardError::NotAccepting("the wizard has no steps".into()));
                };
                let view = StepView {
                    descriptor,
                    index: controller.current_step_index(),
                    total: controller.step_count(),
                    fragment: controller.store().get(descriptor.id),
                    last_error: controller.last_error(),
                    failure: controller.failure_message(),
                };
                interaction.next_action(&view)
            };

            let outcome = match action {
                WizardAction::Abandon => {
                    controller.abandon();
                    return Ok(WizardResult::Abandoned);
                }
                WizardAction::Back => {
                    let notice = if controller.back() {
                        match controller.current_step() {
                            Some(step) => WizardNotice::MovedBack { to: step.id },
                            None => WizardNotice::AlreadyAtFirstStep,
                        }
                    } else {
                        WizardNotice::AlreadyAtFirstStep
                    };
                    interaction.report(&notice);
                    continue;
                }
                WizardAction::Submit(fragment) => controller.submit_step(fragment),
                WizardAction::ChooseOwner(owner) => controller.choose_owner(owner),
                WizardAction::Retry => controller.retry(),
            };
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(error = %err, "action not available in current state");
                    interaction.report(&WizardNotice::NotAvailable(err.to_string()));
                    continue;
                }
            };

            let step = controller.current_step().map(|step| step.id);
            match controller.settle(outcome, self.api)? {
                StepOutcome::Advanced { to, .. } => {
                    interaction.report(&WizardNotice::Advanced { to });
                }
                StepOutcome::Rejected(errors) => {
                    if let Some(step) = step {
                        interaction.report(&WizardNotice::Rejected { step, errors });
                    }
                }
                StepOutcome::SubmissionFailed(message) => {
                    interaction.report(&WizardNotice::SubmissionFailed(message));
                }
                StepOutcome::Completed(data) => {
                    interaction.report(&WizardNotice::Completed);
                    return Ok(WizardResult::Completed(data));
                }
                StepOutcome::Ignored => interaction.report(&WizardNotice::Ignored),
                // `settle` resolves every in-flight submission before returning.
                StepOutcome::Submitting(_) => {}
            }
        }
    }
}
