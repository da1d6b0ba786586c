//! Edit-mode hydration: server record in, draft out.
//!
//! Server field names follow the persisted record, so this is the inverse of
//! assembly. Missing fields never fail; they fall back to the step's empty
//! shape.

use serde_json::Value;

use crate::{
    api::{RecordFetcher, ServerProperty},
    errors::{HydrationError, GENERIC_ERROR_MESSAGE},
};

use super::controller::WizardController;
use super::draft::Draft;
use super::fragments::{
    BankApprovalsFragment, BasicDetails, DocumentRef, DocumentsFragment, Fragment, ImageAsset,
    MediaFragment, Milestone, NearbyPlace, NearbyPlacesFragment, PricingFragment,
};
use super::preview::PreviewTracker;

pub struct HydrationAdapter<'a, F: RecordFetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: RecordFetcher + ?Sized> HydrationAdapter<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Fetches `record_id` and translates it into a draft.
    ///
    /// Any failure is returned whole; a partially translated draft is never
    /// handed out.
    pub fn hydrate(&self, record_id: &str) -> Result<Draft, HydrationError> {
        let envelope = self.fetcher.fetch_by_id(record_id).map_err(|err| {
            tracing::warn!(record = record_id, error = %err, "hydration fetch failed");
            HydrationError::from(err)
        })?;
        if !envelope.success {
            let message = envelope.failure_message_or(GENERIC_ERROR_MESSAGE);
            tracing::warn!(record = record_id, error = %message, "hydration rejected");
            return Err(HydrationError::Fetch(message));
        }
        let property = envelope
            .data
            .ok_or_else(|| HydrationError::Missing(record_id.to_string()))?;
        tracing::info!(record = record_id, "record hydrated");
        Ok(draft_from_server(&property))
    }

    /// Hydrates and opens an edit-mode wizard in one go.
    pub fn open_editor(
        &self,
        record_id: &str,
        previews: PreviewTracker,
    ) -> Result<WizardController, HydrationError> {
        let draft = self.hydrate(record_id)?;
        Ok(WizardController::edit(record_id, draft, previews)?)
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// Servers send numbers as JSON numbers or strings; both become form text.
fn json_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    }
}

fn value_text(value: &Option<Value>) -> String {
    value.as_ref().map(json_text).unwrap_or_default()
}

/// Translates a server record into the edit flow's fragments.
pub fn draft_from_server(property: &ServerProperty) -> Draft {
    let mut draft = Draft::default();

    draft.put(Fragment::BasicDetails(BasicDetails {
        title: text(&property.title),
        kind: text(&property.property_kind),
        property_type: text(&property.listing_type),
        super_built_up_area: value_text(&property.area),
        carpet_area: value_text(&property.carpet_area),
        price: value_text(&property.price),
        bhk: value_text(&property.bedrooms),
        bathrooms: value_text(&property.bathrooms),
        furnishing: text(&property.furnishing),
        description: text(&property.description),
        address: text(&property.address),
        city: text(&property.city),
        locality: text(&property.locality),
    }));

    draft.put(Fragment::Media(MediaFragment {
        images: property
            .images
            .iter()
            .flatten()
            .filter(|url| !url.trim().is_empty())
            .map(ImageAsset::remote)
            .collect(),
        video_url: text(&property.video_url),
    }));

    draft.put(Fragment::Pricing(PricingFragment {
        booking_amount: value_text(&property.booking_amount),
        maintenance_charges: value_text(&property.maintenance_charges),
        price_negotiable: property.price_negotiable.unwrap_or(false),
        milestones: property
            .payment_plan
            .iter()
            .flatten()
            .map(|milestone| {
                Milestone::new(text(&milestone.label), value_text(&milestone.percentage))
            })
            .collect(),
    }));

    draft.put(Fragment::Documents(DocumentsFragment {
        rera_number: text(&property.rera_number),
        documents: property
            .documents
            .iter()
            .flatten()
            .map(|document| DocumentRef {
                name: text(&document.name),
                url: text(&document.url),
            })
            .collect(),
    }));

    draft.put(Fragment::NearbyPlaces(NearbyPlacesFragment {
        places: property
            .distances
            .iter()
            .flatten()
            .map(|(name, distance)| NearbyPlace::new(name.clone(), json_text(distance)))
            .collect(),
    }));

    draft.put(Fragment::BankApprovals(BankApprovalsFragment {
        banks: property.bank_approvals.clone().unwrap_or_default(),
    }));

    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiEnvelope;
    use crate::errors::ApiError;
    use crate::wizard::registry::StepId;
    use serde_json::json;

    struct FixedFetcher(Result<ApiEnvelope<ServerProperty>, ApiError>);

    impl RecordFetcher for FixedFetcher {
        fn fetch_by_id(&self, _id: &str) -> Result<ApiEnvelope<ServerProperty>, ApiError> {
            self.0.clone()
        }
    }

    fn server(value: Value) -> ServerProperty {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn distances_map_becomes_place_list() {
        let property = server(json!({
            "title": "Tower 9",
            "area": 1450,
            "bedrooms": "3",
            "distances": {"Airport": "18", "Metro": 0.8}
        }));
        let draft = draft_from_server(&property);
        assert_eq!(draft.basic_details().super_built_up_area, "1450");
        assert_eq!(draft.basic_details().bhk, "3");
        assert_eq!(
            draft.nearby_places().places,
            vec![NearbyPlace::new("Airport", "18"), NearbyPlace::new("Metro", "0.8")]
        );
    }

    #[test]
    fn absent_fields_hydrate_as_empty_shapes() {
        let draft = draft_from_server(&server(json!({"title": "Bare"})));
        assert_eq!(draft.bank_approvals(), &BankApprovalsFragment::default());
        assert_eq!(draft.media(), &MediaFragment::default());
        assert!(draft.basic_details().price.is_empty());
        assert!(!draft.is_submitted(StepId::OwnerType));
    }

    #[test]
    fn rejected_fetch_surfaces_server_message() {
        let fetcher = FixedFetcher(Ok(ApiEnvelope::failure("Property not found")));
        let err = HydrationAdapter::new(&fetcher).hydrate("p-1").unwrap_err();
        assert_eq!(err, HydrationError::Fetch("Property not found".into()));
    }

    #[test]
    fn success_without_data_is_missing() {
        let fetcher = FixedFetcher(Ok(ApiEnvelope {
            success: true,
            data: None,
            error: None,
        }));
        let err = HydrationAdapter::new(&fetcher).hydrate("p-3").unwrap_err();
        assert_eq!(err, HydrationError::Missing("p-3".into()));
    }

    #[test]
    fn transport_failure_prevents_editor() {
        let fetcher = FixedFetcher(Err(ApiError::Transport("timed out".into())));
        let result = HydrationAdapter::new(&fetcher).open_editor("p-4", PreviewTracker::new());
        assert!(matches!(result, Err(HydrationError::Fetch(ref m)) if m.contains("timed out")));
    }
}
