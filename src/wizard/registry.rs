use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Identifies one step of the property wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    OwnerType,
    BasicDetails,
    Media,
    Pricing,
    Documents,
    NearbyPlaces,
    BankApprovals,
}

impl StepId {
    pub const ALL: [StepId; 7] = [
        StepId::OwnerType,
        StepId::BasicDetails,
        StepId::Media,
        StepId::Pricing,
        StepId::Documents,
        StepId::NearbyPlaces,
        StepId::BankApprovals,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            StepId::OwnerType => "owner-type",
            StepId::BasicDetails => "basic-details",
            StepId::Media => "media",
            StepId::Pricing => "pricing",
            StepId::Documents => "documents",
            StepId::NearbyPlaces => "nearby-places",
            StepId::BankApprovals => "bank-approvals",
        }
    }

    /// Draft key owned by this step.
    pub const fn fragment_key(self) -> &'static str {
        match self {
            StepId::OwnerType => "ownerType",
            StepId::BasicDetails => "basicDetails",
            StepId::Media => "media",
            StepId::Pricing => "pricing",
            StepId::Documents => "documents",
            StepId::NearbyPlaces => "nearbyPlaces",
            StepId::BankApprovals => "bankApprovals",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            StepId::OwnerType => "Who is listing this property?",
            StepId::BasicDetails => "Basic details",
            StepId::Media => "Photos & video",
            StepId::Pricing => "Pricing & payment plan",
            StepId::Documents => "Documents",
            StepId::NearbyPlaces => "Nearby places",
            StepId::BankApprovals => "Bank approvals",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a single wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub id: StepId,
    pub title: &'static str,
    pub fragment_key: &'static str,
}

impl StepDescriptor {
    pub const fn for_step(id: StepId) -> Self {
        Self {
            id,
            title: id.title(),
            fragment_key: id.fragment_key(),
        }
    }
}

/// Ordered, fixed list of steps. Order defines traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    name: &'static str,
    steps: Vec<StepDescriptor>,
}

static CREATE_FLOW: Lazy<StepRegistry> = Lazy::new(|| {
    StepRegistry::new(
        "create-property",
        &[
            StepId::OwnerType,
            StepId::BasicDetails,
            StepId::Media,
            StepId::Pricing,
            StepId::Documents,
            StepId::NearbyPlaces,
            StepId::BankApprovals,
        ],
    )
});

// Owner type is fixed once a property exists.
static EDIT_FLOW: Lazy<StepRegistry> = Lazy::new(|| {
    StepRegistry::new(
        "edit-property",
        &[
            StepId::BasicDetails,
            StepId::Media,
            StepId::Pricing,
            StepId::Documents,
            StepId::NearbyPlaces,
            StepId::BankApprovals,
        ],
    )
});

impl StepRegistry {
    /// Builds a registry; repeated step ids keep their first position.
    pub fn new(name: &'static str, ids: &[StepId]) -> Self {
        let mut steps: Vec<StepDescriptor> = Vec::with_capacity(ids.len());
        for id in ids {
            if steps.iter().any(|existing| existing.id == *id) {
                tracing::warn!(registry = name, step = %id, "duplicate step ignored");
                continue;
            }
            steps.push(StepDescriptor::for_step(*id));
        }
        Self { name, steps }
    }

    pub fn create_flow() -> Self {
        CREATE_FLOW.clone()
    }

    pub fn edit_flow() -> Self {
        EDIT_FLOW.clone()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn step_at(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }

    pub fn key_for(&self, index: usize) -> Option<&'static str> {
        self.steps.get(index).map(|step| step.fragment_key)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn index_of(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    pub fn contains(&self, id: StepId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = StepId> + '_ {
        self.steps.iter().map(|step| step.id)
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }
}
