//! Per-step fragment records.
//!
//! Form fields hold the raw text the user typed; numeric interpretation happens
//! in the validator and during assembly.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::registry::StepId;

/// Who is listing the property. Selected once, at the start of the create flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    Builder,
    Broker,
    Individual,
    Company,
}

impl OwnerType {
    pub const ALL: [OwnerType; 4] = [
        OwnerType::Builder,
        OwnerType::Broker,
        OwnerType::Individual,
        OwnerType::Company,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            OwnerType::Builder => "builder",
            OwnerType::Broker => "broker",
            OwnerType::Individual => "individual",
            OwnerType::Company => "company",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        OwnerType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == normalized)
            .ok_or_else(|| format!("Unknown owner type `{}`", value.trim()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerFragment {
    pub owner_type: Option<OwnerType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicDetails {
    pub title: String,
    /// Property kind shown to buyers, e.g. "Villa" or "Apartment".
    #[serde(rename = "type")]
    pub kind: String,
    /// Listing intent: "sell" or "rent".
    pub property_type: String,
    pub super_built_up_area: String,
    pub carpet_area: String,
    pub price: String,
    pub bhk: String,
    pub bathrooms: String,
    pub furnishing: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub locality: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageSource {
    /// Already uploaded; the url comes from the server.
    Remote { url: String },
    /// Picked locally and shown through a preview handle until uploaded.
    Local { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub name: String,
    pub source: ImageSource,
}

impl ImageAsset {
    pub fn remote(url: impl Into<String>) -> Self {
        let url = url.into();
        let name = url
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(url.as_str())
            .to_string();
        Self {
            name,
            source: ImageSource::Remote { url },
        }
    }

    pub fn local(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ImageSource::Local { path: path.into() },
        }
    }

    pub fn local_path(&self) -> Option<&str> {
        match &self.source {
            ImageSource::Local { path } => Some(path),
            ImageSource::Remote { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaFragment {
    pub images: Vec<ImageAsset>,
    pub video_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestone {
    pub label: String,
    pub percentage: String,
}

impl Milestone {
    pub fn new(label: impl Into<String>, percentage: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            percentage: percentage.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingFragment {
    pub booking_amount: String,
    pub maintenance_charges: String,
    pub price_negotiable: bool,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentsFragment {
    pub rera_number: String,
    pub documents: Vec<DocumentRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyPlace {
    pub name: String,
    pub distance: String,
}

impl NearbyPlace {
    pub fn new(name: impl Into<String>, distance: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            distance: distance.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyPlacesFragment {
    pub places: Vec<NearbyPlace>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankApprovalsFragment {
    pub banks: Vec<String>,
}

/// Data produced by exactly one step, tagged by that step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "kebab-case")]
pub enum Fragment {
    OwnerType(OwnerFragment),
    BasicDetails(BasicDetails),
    Media(MediaFragment),
    Pricing(PricingFragment),
    Documents(DocumentsFragment),
    NearbyPlaces(NearbyPlacesFragment),
    BankApprovals(BankApprovalsFragment),
}

impl Fragment {
    pub fn step(&self) -> StepId {
        match self {
            Fragment::OwnerType(_) => StepId::OwnerType,
            Fragment::BasicDetails(_) => StepId::BasicDetails,
            Fragment::Media(_) => StepId::Media,
            Fragment::Pricing(_) => StepId::Pricing,
            Fragment::Documents(_) => StepId::Documents,
            Fragment::NearbyPlaces(_) => StepId::NearbyPlaces,
            Fragment::BankApprovals(_) => StepId::BankApprovals,
        }
    }

    /// The shape a step starts from before anything was submitted.
    pub fn empty(step: StepId) -> Self {
        match step {
            StepId::OwnerType => Fragment::OwnerType(OwnerFragment::default()),
            StepId::BasicDetails => Fragment::BasicDetails(BasicDetails::default()),
            StepId::Media => Fragment::Media(MediaFragment::default()),
            StepId::Pricing => Fragment::Pricing(PricingFragment::default()),
            StepId::Documents => Fragment::Documents(DocumentsFragment::default()),
            StepId::NearbyPlaces => Fragment::NearbyPlaces(NearbyPlacesFragment::default()),
            StepId::BankApprovals => Fragment::BankApprovals(BankApprovalsFragment::default()),
        }
    }
}
