#![allow(dead_code)]

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use once_cell::sync::Lazy;
use property_wizard::{
    api::{
        ApiClient, ApiEnvelope, ApiRequest, ApiResponse, HttpTransport, PropertyApi, RecordFetcher,
        ServerProperty,
    },
    config::ConfigManager,
    errors::ApiError,
    session::{JsonSessionStore, SessionManager},
    wizard::{
        BankApprovalsFragment, BasicDetails, DocumentRef, DocumentsFragment, Fragment,
        MediaFragment, Milestone, NearbyPlace, NearbyPlacesFragment, PricingFragment,
        PropertyRecord,
    },
};
use serde_json::Value;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated data directory for one test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Config and session managers backed by a unique directory.
pub fn setup_test_env() -> (ConfigManager, SessionManager) {
    let config_manager = ConfigManager::with_base_dir(temp_base());
    let config = config_manager.load().expect("load default config");
    let store = Arc::new(JsonSessionStore::new(config_manager.session_path(&config)));
    let session_manager = SessionManager::load(store).expect("load empty session");
    (config_manager, session_manager)
}

/// Property API double that records every call and replays queued replies.
/// Once the queue is empty every call succeeds with `{"id": "p-1"}`.
#[derive(Default)]
pub struct MockPropertyApi {
    replies: Mutex<VecDeque<Result<ApiEnvelope<Value>, ApiError>>>,
    calls: Mutex<Vec<(String, PropertyRecord)>>,
}

impl MockPropertyApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<Result<ApiEnvelope<Value>, ApiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, PropertyRecord)> {
        self.calls.lock().expect("lock calls").clone()
    }

    fn reply(&self, call: String, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError> {
        self.calls
            .lock()
            .expect("lock calls")
            .push((call, record.clone()));
        self.replies
            .lock()
            .expect("lock replies")
            .pop_front()
            .unwrap_or_else(|| Ok(ApiEnvelope::ok(serde_json::json!({"id": "p-1"}))))
    }
}

impl PropertyApi for MockPropertyApi {
    fn create(&self, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError> {
        self.reply("create".into(), record)
    }

    fn update(&self, id: &str, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError> {
        self.reply(format!("update:{id}"), record)
    }
}

/// Fetcher returning a fixed server payload.
pub struct MockFetcher {
    pub reply: Result<ApiEnvelope<ServerProperty>, ApiError>,
}

impl MockFetcher {
    pub fn returning(property: Value) -> Self {
        let property = serde_json::from_value(property).expect("valid server property");
        Self {
            reply: Ok(ApiEnvelope::ok(property)),
        }
    }
}

impl RecordFetcher for MockFetcher {
    fn fetch_by_id(&self, _id: &str) -> Result<ApiEnvelope<ServerProperty>, ApiError> {
        self.reply.clone()
    }
}

/// HTTP transport replaying canned `(status, body)` pairs and keeping every request.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<(u16, Value)>>,
    pub requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<(u16, Value)>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("lock requests").clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests
            .lock()
            .expect("lock requests")
            .push(request.clone());
        self.responses
            .lock()
            .expect("lock responses")
            .pop_front()
            .map(|(status, body)| ApiResponse::new(status, body))
            .ok_or_else(|| ApiError::Transport("no scripted response left".into()))
    }
}

pub fn client_for(
    transport: ScriptedTransport,
    sessions: &SessionManager,
) -> ApiClient<ScriptedTransport> {
    ApiClient::new(
        transport,
        "http://api.test/api/",
        sessions.shared(),
        sessions.store(),
    )
}

pub fn villa_basic_details() -> Fragment {
    Fragment::BasicDetails(BasicDetails {
        title: "Villa A".into(),
        kind: "Villa".into(),
        property_type: "sell".into(),
        super_built_up_area: "2000".into(),
        carpet_area: "1700".into(),
        price: "10000000".into(),
        bhk: "4".into(),
        bathrooms: "3".into(),
        city: "Pune".into(),
        ..BasicDetails::default()
    })
}

pub fn empty_media() -> Fragment {
    Fragment::Media(MediaFragment::default())
}

pub fn standard_pricing() -> Fragment {
    Fragment::Pricing(PricingFragment {
        booking_amount: "500000".into(),
        maintenance_charges: "3500".into(),
        price_negotiable: true,
        milestones: vec![
            Milestone::new("Booking", "10"),
            Milestone::new("Possession", "90"),
        ],
    })
}

pub fn rera_documents() -> Fragment {
    Fragment::Documents(DocumentsFragment {
        rera_number: "P52100012345".into(),
        documents: vec![DocumentRef {
            name: "Approval".into(),
            url: "https://files.test/approval.pdf".into(),
        }],
    })
}

pub fn metro_nearby() -> Fragment {
    Fragment::NearbyPlaces(NearbyPlacesFragment {
        places: vec![NearbyPlace::new("Metro", "1.2")],
    })
}

pub fn banks(names: &[&str]) -> Fragment {
    Fragment::BankApprovals(BankApprovalsFragment {
        banks: names.iter().map(|name| name.to_string()).collect(),
    })
}
