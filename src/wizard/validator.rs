//! Per-step field validation.
//!
//! Validation never fails as a Rust error: every problem becomes an entry in
//! [`ValidationResult::errors`], keyed by the form field name so the caller can
//! render it next to the input. List entries use `field[index].sub` keys.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::fragments::{
    BankApprovalsFragment, BasicDetails, DocumentsFragment, Fragment, MediaFragment,
    NearbyPlacesFragment, OwnerFragment, PricingFragment,
};
use super::registry::StepId;

const PERCENT_EPSILON: f64 = 1e-9;

/// Outcome of one submit attempt, produced fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: BTreeMap::new(),
        }
    }

    pub fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Collects field errors; the first message recorded for a field wins.
#[derive(Default)]
struct Errors(BTreeMap<String, String>);

impl Errors {
    fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    fn finish(self) -> ValidationResult {
        ValidationResult::from_errors(self.0)
    }
}

/// Validates `fragment` against the rules of `step`.
pub fn validate(step: StepId, fragment: &Fragment) -> ValidationResult {
    if fragment.step() != step {
        let mut errors = Errors::default();
        errors.add(
            "step",
            format!(
                "Expected data for `{}`, received `{}`",
                step,
                fragment.step()
            ),
        );
        return errors.finish();
    }

    match fragment {
        Fragment::OwnerType(owner) => validate_owner(owner),
        Fragment::BasicDetails(details) => validate_basic_details(details),
        Fragment::Media(media) => validate_media(media),
        Fragment::Pricing(pricing) => validate_pricing(pricing),
        Fragment::Documents(documents) => validate_documents(documents),
        Fragment::NearbyPlaces(places) => validate_nearby_places(places),
        Fragment::BankApprovals(banks) => validate_bank_approvals(banks),
    }
}

/// Parses a number after dropping everything that is not a digit or a dot,
/// so inputs like `"1,20,000"` or `"2000 sq.ft"` are accepted.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.')
        .collect();
    let stripped = stripped.trim_matches('.');
    if stripped.is_empty() {
        return None;
    }
    stripped
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Whole-number variant of [`parse_numeric`].
pub fn parse_whole(raw: &str) -> Option<u32> {
    parse_numeric(raw)
        .filter(|value| value.fract() == 0.0 && *value <= f64::from(u32::MAX))
        .map(|value| value as u32)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require(errors: &mut Errors, field: &str, value: &str, label: &str) {
    if is_blank(value) {
        errors.add(field, format!("{label} is required"));
    }
}

fn check_numeric(errors: &mut Errors, field: &str, value: &str, label: &str) {
    if errors.has(field) || is_blank(value) {
        return;
    }
    if parse_numeric(value).is_none() {
        errors.add(field, format!("{label} must be a number"));
    }
}

fn check_whole(errors: &mut Errors, field: &str, value: &str, label: &str) {
    if is_blank(value) {
        return;
    }
    if parse_whole(value).is_none() {
        errors.add(field, format!("{label} must be a whole number"));
    }
}

fn validate_owner(owner: &OwnerFragment) -> ValidationResult {
    let mut errors = Errors::default();
    if owner.owner_type.is_none() {
        errors.add("ownerType", "Select who is listing the property");
    }
    errors.finish()
}

fn validate_basic_details(details: &BasicDetails) -> ValidationResult {
    let mut errors = Errors::default();
    require(&mut errors, "title", &details.title, "Title");
    require(&mut errors, "propertyType", &details.property_type, "Property type");
    require(&mut errors, "superBuiltUpArea", &details.super_built_up_area, "Area");
    require(&mut errors, "price", &details.price, "Price");

    check_numeric(&mut errors, "superBuiltUpArea", &details.super_built_up_area, "Area");
    check_numeric(&mut errors, "price", &details.price, "Price");
    check_numeric(&mut errors, "carpetArea", &details.carpet_area, "Carpet area");
    check_whole(&mut errors, "bhk", &details.bhk, "BHK");
    check_whole(&mut errors, "bathrooms", &details.bathrooms, "Bathrooms");
    errors.finish()
}

fn validate_media(media: &MediaFragment) -> ValidationResult {
    let mut errors = Errors::default();
    for (index, image) in media.images.iter().enumerate() {
        if is_blank(&image.name) {
            errors.add(format!("images[{index}].name"), "Image name is required");
        }
    }
    errors.finish()
}

fn validate_pricing(pricing: &PricingFragment) -> ValidationResult {
    let mut errors = Errors::default();
    check_numeric(&mut errors, "bookingAmount", &pricing.booking_amount, "Booking amount");
    check_numeric(
        &mut errors,
        "maintenanceCharges",
        &pricing.maintenance_charges,
        "Maintenance charges",
    );

    let mut running_total = 0.0;
    for (index, milestone) in pricing.milestones.iter().enumerate() {
        if is_blank(&milestone.label) {
            errors.add(
                format!("milestones[{index}].label"),
                "Milestone name is required",
            );
        }
        let field = format!("milestones[{index}].percentage");
        match parse_numeric(&milestone.percentage) {
            None => errors.add(field, "Percentage must be a number"),
            Some(value) if value <= 0.0 || value > 100.0 => {
                errors.add(field, "Percentage must be greater than 0 and at most 100")
            }
            Some(value) => {
                running_total += value;
                if running_total > 100.0 + PERCENT_EPSILON {
                    errors.add(field, "Milestones cannot add up to more than 100%");
                }
            }
        }
    }
    errors.finish()
}

fn validate_documents(documents: &DocumentsFragment) -> ValidationResult {
    let mut errors = Errors::default();
    for (index, document) in documents.documents.iter().enumerate() {
        require(
            &mut errors,
            &format!("documents[{index}].name"),
            &document.name,
            "Document name",
        );
        require(
            &mut errors,
            &format!("documents[{index}].url"),
            &document.url,
            "Document file",
        );
    }
    errors.finish()
}

fn validate_nearby_places(places: &NearbyPlacesFragment) -> ValidationResult {
    let mut errors = Errors::default();
    for (index, place) in places.places.iter().enumerate() {
        require(
            &mut errors,
            &format!("places[{index}].name"),
            &place.name,
            "Place name",
        );
        let field = format!("places[{index}].distance");
        require(&mut errors, &field, &place.distance, "Distance");
        check_numeric(&mut errors, &field, &place.distance, "Distance");
    }
    errors.finish()
}

fn validate_bank_approvals(banks: &BankApprovalsFragment) -> ValidationResult {
    let mut errors = Errors::default();
    let mut seen = HashSet::new();
    for (index, bank) in banks.banks.iter().enumerate() {
        let field = format!("banks[{index}]");
        if is_blank(bank) {
            errors.add(field, "Bank name is required");
        } else if !seen.insert(bank.trim().to_ascii_lowercase()) {
            errors.add(field, format!("{} is listed more than once", bank.trim()));
        }
    }
    errors.finish()
}
