use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::WizardError;

use super::assembly::{self, PropertyRecord};
use super::fragments::{
    BankApprovalsFragment, BasicDetails, DocumentsFragment, Fragment, MediaFragment,
    NearbyPlacesFragment, OwnerFragment, PricingFragment,
};
use super::preview::{PreviewHandle, PreviewTracker};
use super::registry::{StepId, StepRegistry};

/// Every fragment collected so far, one slot per step.
///
/// Slots start at their empty shape, so reading a step that was never
/// submitted yields its default rather than nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    owner_type: OwnerFragment,
    basic_details: BasicDetails,
    media: MediaFragment,
    pricing: PricingFragment,
    documents: DocumentsFragment,
    nearby_places: NearbyPlacesFragment,
    bank_approvals: BankApprovalsFragment,
    submitted: BTreeSet<StepId>,
}

impl Draft {
    pub fn get(&self, step: StepId) -> Fragment {
        match step {
            StepId::OwnerType => Fragment::OwnerType(self.owner_type.clone()),
            StepId::BasicDetails => Fragment::BasicDetails(self.basic_details.clone()),
            StepId::Media => Fragment::Media(self.media.clone()),
            StepId::Pricing => Fragment::Pricing(self.pricing.clone()),
            StepId::Documents => Fragment::Documents(self.documents.clone()),
            StepId::NearbyPlaces => Fragment::NearbyPlaces(self.nearby_places.clone()),
            StepId::BankApprovals => Fragment::BankApprovals(self.bank_approvals.clone()),
        }
    }

    /// Replaces the slot owned by the fragment's step. Other slots are untouched.
    pub(crate) fn put(&mut self, fragment: Fragment) {
        self.submitted.insert(fragment.step());
        match fragment {
            Fragment::OwnerType(value) => self.owner_type = value,
            Fragment::BasicDetails(value) => self.basic_details = value,
            Fragment::Media(value) => self.media = value,
            Fragment::Pricing(value) => self.pricing = value,
            Fragment::Documents(value) => self.documents = value,
            Fragment::NearbyPlaces(value) => self.nearby_places = value,
            Fragment::BankApprovals(value) => self.bank_approvals = value,
        }
    }

    pub fn is_submitted(&self, step: StepId) -> bool {
        self.submitted.contains(&step)
    }

    pub fn submitted_steps(&self) -> impl Iterator<Item = StepId> + '_ {
        self.submitted.iter().copied()
    }

    pub fn owner(&self) -> &OwnerFragment {
        &self.owner_type
    }

    pub fn basic_details(&self) -> &BasicDetails {
        &self.basic_details
    }

    pub fn media(&self) -> &MediaFragment {
        &self.media
    }

    pub fn pricing(&self) -> &PricingFragment {
        &self.pricing
    }

    pub fn documents(&self) -> &DocumentsFragment {
        &self.documents
    }

    pub fn nearby_places(&self) -> &NearbyPlacesFragment {
        &self.nearby_places
    }

    pub fn bank_approvals(&self) -> &BankApprovalsFragment {
        &self.bank_approvals
    }
}

/// Mutable draft bound to the steps of one registry.
///
/// Only fragments for registered steps are accepted. Local image previews are
/// held here for as long as the media fragment that references them.
#[derive(Debug)]
pub struct DraftStore {
    steps: Vec<StepId>,
    draft: Draft,
    previews: PreviewTracker,
    held: BTreeMap<String, PreviewHandle>,
}

impl DraftStore {
    pub fn new(registry: &StepRegistry, previews: PreviewTracker) -> Self {
        Self {
            steps: registry.ids().collect(),
            draft: Draft::default(),
            previews,
            held: BTreeMap::new(),
        }
    }

    /// Seeds the store from an existing draft, e.g. one produced by hydration.
    pub fn from_draft(
        registry: &StepRegistry,
        draft: Draft,
        previews: PreviewTracker,
    ) -> Result<Self, WizardError> {
        if let Some(step) = draft.submitted_steps().find(|step| !registry.contains(*step)) {
            return Err(WizardError::UnknownStep(step));
        }
        let mut store = Self::new(registry, previews);
        store.sync_previews(&draft.media);
        store.draft = draft;
        Ok(store)
    }

    pub fn get(&self, step: StepId) -> Fragment {
        self.draft.get(step)
    }

    pub fn merge(&mut self, fragment: Fragment) -> Result<(), WizardError> {
        let step = fragment.step();
        if !self.steps.contains(&step) {
            return Err(WizardError::UnknownStep(step));
        }
        if let Fragment::Media(media) = &fragment {
            self.sync_previews(media);
        }
        self.draft.put(fragment);
        tracing::debug!(step = %step, "fragment merged");
        Ok(())
    }

    pub fn assemble(&self) -> PropertyRecord {
        assembly::assemble(&self.draft, self.steps.iter().copied())
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn preview_for(&self, path: &str) -> Option<&PreviewHandle> {
        self.held.get(path)
    }

    pub fn held_previews(&self) -> usize {
        self.held.len()
    }

    /// Drops all collected data and releases every preview.
    pub fn discard(&mut self) {
        self.held.clear();
        self.draft = Draft::default();
    }

    // Keeps handles for paths still referenced, releases the rest, and
    // acquires handles for newly referenced paths.
    fn sync_previews(&mut self, media: &MediaFragment) {
        let wanted: BTreeSet<&str> = media
            .images
            .iter()
            .filter_map(|image| image.local_path())
            .collect();
        self.held.retain(|path, _| wanted.contains(path.as_str()));
        for path in wanted {
            if !self.held.contains_key(path) {
                let handle = self.previews.acquire(path);
                self.held.insert(path.to_string(), handle);
            }
        }
    }
}
