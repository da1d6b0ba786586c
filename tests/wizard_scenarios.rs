mod common;

use common::{
    banks, empty_media, metro_nearby, rera_documents, standard_pricing, villa_basic_details,
    MockFetcher, MockPropertyApi,
};
use property_wizard::{
    api::ApiEnvelope,
    errors::{ApiError, WizardError, GENERIC_ERROR_MESSAGE},
    wizard::{
        BasicDetails, Fragment, HydrationAdapter, ImageAsset, MediaFragment, OwnerType,
        PreviewTracker, StepId, StepOutcome, WizardController, WizardPhase,
    },
};
use serde_json::json;

fn builder_wizard_at_bank_approvals() -> WizardController {
    let mut wizard = WizardController::create(PreviewTracker::new());
    wizard.choose_owner(OwnerType::Builder).unwrap();
    for fragment in [
        villa_basic_details(),
        empty_media(),
        standard_pricing(),
        rera_documents(),
        metro_nearby(),
    ] {
        let outcome = wizard.submit_step(fragment).unwrap();
        assert!(matches!(outcome, StepOutcome::Advanced { .. }), "{outcome:?}");
    }
    wizard
}

#[test]
fn builder_flow_advances_through_basic_details_and_media() {
    let mut wizard = WizardController::create(PreviewTracker::new());
    wizard.choose_owner(OwnerType::Builder).unwrap();

    let basic = Fragment::BasicDetails(BasicDetails {
        title: "Villa A".into(),
        kind: "Villa".into(),
        property_type: "sell".into(),
        super_built_up_area: "2000".into(),
        price: "10000000".into(),
        ..BasicDetails::default()
    });
    wizard.submit_step(basic).unwrap();
    assert_eq!(wizard.current_step_index(), 2);
    assert_eq!(wizard.current_step().map(|s| s.id), Some(StepId::Media));

    wizard
        .submit_step(Fragment::Media(MediaFragment::default()))
        .unwrap();
    assert_eq!(wizard.current_step_index(), 3);
    assert_eq!(wizard.current_step().map(|s| s.id), Some(StepId::Pricing));
}

#[test]
fn duplicate_title_failure_keeps_wizard_on_last_step() {
    let mut wizard = builder_wizard_at_bank_approvals();
    let api = MockPropertyApi::with_replies(vec![Ok(ApiEnvelope::failure("Duplicate title"))]);

    let StepOutcome::Submitting(ticket) = wizard.submit_step(banks(&["HDFC"])).unwrap() else {
        panic!("last step should start the submission");
    };
    let draft_before = wizard.draft().clone();

    let outcome = wizard.settle(StepOutcome::Submitting(ticket), &api).unwrap();
    assert!(matches!(outcome, StepOutcome::SubmissionFailed(ref m) if m == "Duplicate title"));
    assert_eq!(wizard.phase(), WizardPhase::Failed);
    assert_eq!(wizard.current_step_index(), 6);
    assert_eq!(wizard.current_step().map(|s| s.id), Some(StepId::BankApprovals));
    assert_eq!(wizard.failure_message(), Some("Duplicate title"));
    assert_eq!(wizard.draft(), &draft_before);

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "create");
    assert_eq!(calls[0].1.owner_type, Some(OwnerType::Builder));
    assert_eq!(calls[0].1.bedrooms, Some(4));
    assert_eq!(calls[0].1.area, Some(2000.0));
    assert_eq!(calls[0].1.distances.get("Metro").map(String::as_str), Some("1.2"));
}

#[test]
fn failed_submission_allows_fixing_an_upstream_step() {
    let mut wizard = builder_wizard_at_bank_approvals();
    let api = MockPropertyApi::with_replies(vec![Err(ApiError::Transport("offline".into()))]);
    wizard
        .submit_and_persist(banks(&["SBI"]), &api)
        .unwrap();
    assert_eq!(wizard.phase(), WizardPhase::Failed);

    assert!(wizard.back());
    assert_eq!(wizard.current_step().map(|s| s.id), Some(StepId::NearbyPlaces));
    assert_eq!(wizard.current_fragment(), Some(metro_nearby()));
    assert!(wizard.failure_message().is_none());

    wizard.submit_step(metro_nearby()).unwrap();
    assert_eq!(wizard.current_fragment(), Some(banks(&["SBI"])));
    let outcome = wizard.submit_and_persist(banks(&["SBI"]), &api).unwrap();
    assert!(matches!(outcome, StepOutcome::Completed(Some(_))));
    assert_eq!(api.calls().len(), 2);
}

#[test]
fn non_numeric_price_is_rejected_in_place() {
    let mut wizard = WizardController::create(PreviewTracker::new());
    wizard.choose_owner(OwnerType::Individual).unwrap();

    let outcome = wizard
        .submit_step(Fragment::BasicDetails(BasicDetails {
            title: "Flat".into(),
            property_type: "rent".into(),
            super_built_up_area: "900".into(),
            price: "abc".into(),
            ..BasicDetails::default()
        }))
        .unwrap();

    let StepOutcome::Rejected(result) = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert!(!result.valid);
    assert!(result.error_for("price").is_some());
    assert_eq!(wizard.current_step_index(), 1);
    assert_eq!(wizard.last_error(), Some(&result));
    assert!(!wizard.draft().is_submitted(StepId::BasicDetails));
}

#[test]
fn fresh_wizard_assembles_every_default() {
    let wizard = WizardController::create(PreviewTracker::new());
    let record = serde_json::to_value(wizard.assemble()).unwrap();

    for key in [
        "title",
        "area",
        "price",
        "bedrooms",
        "images",
        "pendingUploads",
        "videoUrl",
        "paymentPlan",
        "priceNegotiable",
        "documents",
        "reraNumber",
        "distances",
        "bankApprovals",
    ] {
        assert!(record.get(key).is_some(), "missing {key}");
    }
    assert_eq!(record["images"], json!([]));
    assert_eq!(record["distances"], json!({}));
    assert_eq!(record["bankApprovals"], json!([]));
    assert!(record.get("ownerType").is_none());
}

#[test]
fn back_then_resubmit_reproduces_the_draft() {
    let mut wizard = WizardController::create(PreviewTracker::new());
    wizard.choose_owner(OwnerType::Broker).unwrap();
    wizard.submit_step(villa_basic_details()).unwrap();
    wizard.submit_step(empty_media()).unwrap();
    let before = wizard.draft().clone();

    assert!(wizard.back());
    let shown = wizard.current_fragment().unwrap();
    assert_eq!(shown, empty_media());
    wizard.submit_step(shown).unwrap();

    assert_eq!(wizard.draft(), &before);
    assert_eq!(wizard.current_step().map(|s| s.id), Some(StepId::Pricing));
}

#[test]
fn replacing_media_releases_old_previews() {
    let previews = PreviewTracker::new();
    let mut wizard = WizardController::create(previews.clone());
    wizard.choose_owner(OwnerType::Company).unwrap();
    wizard.submit_step(villa_basic_details()).unwrap();

    wizard
        .submit_step(Fragment::Media(MediaFragment {
            images: vec![
                ImageAsset::local("front.jpg", "/tmp/front.jpg"),
                ImageAsset::remote("https://cdn.test/back.jpg"),
            ],
            video_url: String::new(),
        }))
        .unwrap();
    assert_eq!(previews.live_count(), 1);

    assert!(wizard.back());
    wizard.submit_step(empty_media()).unwrap();
    assert_eq!(previews.live_count(), 0);

    wizard.abandon();
    assert_eq!(previews.live_count(), 0);
}

#[test]
fn completed_create_discards_draft_and_previews() {
    let previews = PreviewTracker::new();
    let mut wizard = WizardController::create(previews.clone());
    wizard.choose_owner(OwnerType::Builder).unwrap();
    wizard.submit_step(villa_basic_details()).unwrap();
    wizard
        .submit_step(Fragment::Media(MediaFragment {
            images: vec![ImageAsset::local("a.jpg", "/tmp/a.jpg")],
            video_url: String::new(),
        }))
        .unwrap();
    let api = MockPropertyApi::new();
    for fragment in [
        standard_pricing(),
        rera_documents(),
        metro_nearby(),
        banks(&[]),
    ] {
        wizard.submit_and_persist(fragment, &api).unwrap();
    }

    assert_eq!(wizard.phase(), WizardPhase::Completed);
    assert_eq!(previews.live_count(), 0);
    assert_eq!(api.calls()[0].1.pending_uploads, vec!["/tmp/a.jpg".to_string()]);
    assert!(matches!(
        wizard.submit_step(villa_basic_details()),
        Err(WizardError::NotAccepting(_))
    ));
}

#[test]
fn unexplained_rejection_falls_back_to_generic_message() {
    let mut wizard = builder_wizard_at_bank_approvals();
    let api = MockPropertyApi::with_replies(vec![Ok(ApiEnvelope {
        success: false,
        data: None,
        error: None,
    })]);
    let outcome = wizard.submit_and_persist(banks(&[]), &api).unwrap();
    assert!(matches!(outcome, StepOutcome::SubmissionFailed(ref m) if m == GENERIC_ERROR_MESSAGE));
}

#[test]
fn edit_flow_updates_hydrated_record() {
    let fetcher = MockFetcher::returning(json!({
        "_id": "p-88",
        "title": "Tower 9",
        "listingType": "sell",
        "area": 1450,
        "price": "9500000",
        "bedrooms": 3,
        "distances": {"School": "2"}
    }));
    let mut wizard = HydrationAdapter::new(&fetcher)
        .open_editor("p-88", PreviewTracker::new())
        .unwrap();
    assert_eq!(wizard.step_count(), 6);
    assert_eq!(wizard.current_step().map(|s| s.id), Some(StepId::BasicDetails));

    let api = MockPropertyApi::new();
    for _ in 0..wizard.step_count() {
        let fragment = wizard.current_fragment().expect("wizard still open");
        let outcome = wizard.submit_and_persist(fragment, &api).unwrap();
        assert!(!matches!(outcome, StepOutcome::Rejected(_)), "{outcome:?}");
    }
    assert_eq!(wizard.phase(), WizardPhase::Completed);

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "update:p-88");
    assert_eq!(calls[0].1.title, "Tower 9");
    assert_eq!(calls[0].1.price, Some(9_500_000.0));
    assert_eq!(calls[0].1.bedrooms, Some(3));
    assert_eq!(calls[0].1.distances.get("School").map(String::as_str), Some("2"));
}
