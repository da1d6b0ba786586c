//! Flattening of a draft into the record the persistence API expects.
//!
//! Step-local names and persisted names diverge on purpose:
//! `bhk` becomes `bedrooms`, `superBuiltUpArea` becomes `area`, `type` becomes
//! `propertyKind`, `propertyType` becomes `listingType`, nearby places become a
//! `distances` map and banks become `bankApprovals`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::draft::Draft;
use super::fragments::{ImageSource, OwnerType};
use super::registry::StepId;
use super::validator::{parse_numeric, parse_whole};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMilestone {
    pub label: String,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDocument {
    pub name: String,
    pub url: String,
}

/// Flat property record sent to `create` / `update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_type: Option<OwnerType>,
    pub title: String,
    pub property_kind: String,
    pub listing_type: String,
    pub area: Option<f64>,
    pub carpet_area: Option<f64>,
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub furnishing: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub locality: String,
    pub images: Vec<String>,
    pub pending_uploads: Vec<String>,
    pub video_url: String,
    pub booking_amount: Option<f64>,
    pub maintenance_charges: Option<f64>,
    pub price_negotiable: bool,
    pub payment_plan: Vec<PaymentMilestone>,
    pub rera_number: String,
    pub documents: Vec<RecordDocument>,
    pub distances: BTreeMap<String, String>,
    pub bank_approvals: Vec<String>,
}

fn numeric(raw: &str) -> Option<f64> {
    if raw.trim().is_empty() {
        None
    } else {
        parse_numeric(raw)
    }
}

fn text(raw: &str) -> String {
    raw.trim().to_string()
}

/// Reduces `draft` into a [`PropertyRecord`], covering every step in `steps`.
///
/// Steps never submitted contribute their empty shape. Values that do not
/// parse assemble as `None`, so this is safe to call on partial drafts.
pub fn assemble(draft: &Draft, steps: impl IntoIterator<Item = StepId>) -> PropertyRecord {
    let mut record = PropertyRecord::default();
    for step in steps {
        apply_step(&mut record, draft, step);
    }
    record
}

// Exhaustive on purpose: a new step does not compile until it is assembled.
fn apply_step(record: &mut PropertyRecord, draft: &Draft, step: StepId) {
    match step {
        StepId::OwnerType => {
            record.owner_type = draft.owner().owner_type;
        }
        StepId::BasicDetails => {
            let details = draft.basic_details();
            record.title = text(&details.title);
            record.property_kind = text(&details.kind);
            record.listing_type = text(&details.property_type);
            record.area = numeric(&details.super_built_up_area);
            record.carpet_area = numeric(&details.carpet_area);
            record.price = numeric(&details.price);
            record.bedrooms = parse_whole(&details.bhk);
            record.bathrooms = parse_whole(&details.bathrooms);
            record.furnishing = text(&details.furnishing);
            record.description = details.description.trim_end().to_string();
            record.address = text(&details.address);
            record.city = text(&details.city);
            record.locality = text(&details.locality);
        }
        StepId::Media => {
            let media = draft.media();
            for image in &media.images {
                match &image.source {
                    ImageSource::Remote { url } => record.images.push(url.clone()),
                    ImageSource::Local { path } => record.pending_uploads.push(path.clone()),
                }
            }
            record.video_url = text(&media.video_url);
        }
        StepId::Pricing => {
            let pricing = draft.pricing();
            record.booking_amount = numeric(&pricing.booking_amount);
            record.maintenance_charges = numeric(&pricing.maintenance_charges);
            record.price_negotiable = pricing.price_negotiable;
            record.payment_plan = pricing
                .milestones
                .iter()
                .map(|milestone| PaymentMilestone {
                    label: text(&milestone.label),
                    percentage: numeric(&milestone.percentage),
                })
                .collect();
        }
        StepId::Documents => {
            let documents = draft.documents();
            record.rera_number = text(&documents.rera_number);
            record.documents = documents
                .documents
                .iter()
                .map(|document| RecordDocument {
                    name: text(&document.name),
                    url: text(&document.url),
                })
                .collect();
        }
        StepId::NearbyPlaces => {
            record.distances = draft
                .nearby_places()
                .places
                .iter()
                .filter(|place| !place.name.trim().is_empty())
                .map(|place| (text(&place.name), text(&place.distance)))
                .collect();
        }
        StepId::BankApprovals => {
            record.bank_approvals = draft
                .bank_approvals()
                .banks
                .iter()
                .map(|bank| text(bank))
                .filter(|bank| !bank.is_empty())
                .collect();
        }
    }
}
