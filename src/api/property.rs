use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{errors::ApiError, wizard::PropertyRecord};

use super::client::{ApiClient, HttpTransport, Method};
use super::envelope::ApiEnvelope;

/// Persists assembled records.
pub trait PropertyApi {
    fn create(&self, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError>;
    fn update(&self, id: &str, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError>;
}

/// Loads an existing record for edit mode.
pub trait RecordFetcher {
    fn fetch_by_id(&self, id: &str) -> Result<ApiEnvelope<ServerProperty>, ApiError>;
}

/// Property as the server returns it.
///
/// Every field is optional on the wire; absent fields decode to empty values.
/// Numeric fields are kept as raw JSON because the server sends both numbers
/// and strings for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerProperty {
    pub id: Option<String>,
    #[serde(rename = "_id")]
    pub mongo_id: Option<String>,
    pub owner_type: Option<String>,
    pub title: Option<String>,
    pub property_kind: Option<String>,
    pub listing_type: Option<String>,
    pub area: Option<Value>,
    pub carpet_area: Option<Value>,
    pub price: Option<Value>,
    pub bedrooms: Option<Value>,
    pub bathrooms: Option<Value>,
    pub furnishing: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub images: Option<Vec<String>>,
    pub video_url: Option<String>,
    pub booking_amount: Option<Value>,
    pub maintenance_charges: Option<Value>,
    pub price_negotiable: Option<bool>,
    pub payment_plan: Option<Vec<ServerMilestone>>,
    pub rera_number: Option<String>,
    pub documents: Option<Vec<ServerDocument>>,
    pub distances: Option<BTreeMap<String, Value>>,
    pub bank_approvals: Option<Vec<String>>,
}

impl ServerProperty {
    /// Record id, preferring `id` over the database `_id`.
    pub fn record_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .or(self.mongo_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerMilestone {
    pub label: Option<String>,
    pub percentage: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerDocument {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// REST implementation backed by [`ApiClient`].
pub struct RestPropertyApi<T: HttpTransport> {
    client: ApiClient<T>,
    collection: String,
}

impl<T: HttpTransport> RestPropertyApi<T> {
    pub fn new(client: ApiClient<T>, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection, id)
    }
}

fn to_body(record: &PropertyRecord) -> Result<Value, ApiError> {
    serde_json::to_value(record).map_err(|err| ApiError::Decode(err.to_string()))
}

impl<T: HttpTransport> PropertyApi for RestPropertyApi<T> {
    fn create(&self, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError> {
        self.client
            .request(Method::Post, &self.collection, Some(to_body(record)?))
    }

    fn update(&self, id: &str, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError> {
        self.client
            .request(Method::Put, &self.item_path(id), Some(to_body(record)?))
    }
}

impl<T: HttpTransport> RecordFetcher for RestPropertyApi<T> {
    fn fetch_by_id(&self, id: &str) -> Result<ApiEnvelope<ServerProperty>, ApiError> {
        self.client.request(Method::Get, &self.item_path(id), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::{ApiRequest, ApiResponse};
    use crate::session::{MemorySessionStore, Session};
    use serde_json::json;
    use std::sync::{Arc, Mutex, RwLock};

    struct CannedTransport {
        body: Value,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl HttpTransport for CannedTransport {
        fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(ApiResponse::new(200, self.body.clone()))
        }
    }

    fn api(body: Value) -> RestPropertyApi<CannedTransport> {
        let transport = CannedTransport {
            body,
            seen: Mutex::new(Vec::new()),
        };
        let client = ApiClient::new(
            transport,
            "http://api.test",
            Arc::new(RwLock::new(Session::default())),
            Arc::new(MemorySessionStore::new()),
        );
        RestPropertyApi::new(client, "/properties/")
    }

    #[test]
    fn create_posts_camel_case_record() {
        let api = api(json!({"success": true, "data": {"id": "p-1"}}));
        let record = PropertyRecord {
            title: "Villa A".into(),
            bedrooms: Some(3),
            ..PropertyRecord::default()
        };
        let envelope = api.create(&record).unwrap();
        assert!(envelope.success);

        let seen = api.client().transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].url, "http://api.test/properties");
        let body = seen[0].body.as_ref().unwrap();
        assert_eq!(body["title"], "Villa A");
        assert_eq!(body["bedrooms"], 3);
    }

    #[test]
    fn update_targets_item_path() {
        let api = api(json!({"success": true}));
        api.update("p-9", &PropertyRecord::default()).unwrap();
        let seen = api.client().transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Put);
        assert_eq!(seen[0].url, "http://api.test/properties/p-9");
    }

    #[test]
    fn fetch_tolerates_sparse_records() {
        let api = api(json!({"success": true, "data": {"_id": "p-2", "title": "Plot", "price": 5000}}));
        let envelope = api.fetch_by_id("p-2").unwrap();
        let property = envelope.data.unwrap();
        assert_eq!(property.record_id(), Some("p-2"));
        assert_eq!(property.price, Some(json!(5000)));
        assert!(property.bank_approvals.is_none());
    }

    #[test]
    fn record_with_both_id_keys_decodes() {
        let property: ServerProperty =
            serde_json::from_value(json!({"_id": "db-1", "id": "p-1", "title": "Villa"})).unwrap();
        assert_eq!(property.record_id(), Some("p-1"));
        assert_eq!(property.mongo_id.as_deref(), Some("db-1"));

        let legacy: ServerProperty = serde_json::from_value(json!({"_id": "db-2", "id": ""})).unwrap();
        assert_eq!(legacy.record_id(), Some("db-2"));
    }
}
