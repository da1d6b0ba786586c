//! Boundary to the remote REST API.

pub mod client;
pub mod envelope;
pub mod property;

pub use client::{ApiClient, ApiRequest, ApiResponse, HttpTransport, Method};
pub use envelope::{ApiEnvelope, ApiErrorBody};
pub use property::{
    PropertyApi, RecordFetcher, RestPropertyApi, ServerDocument, ServerMilestone, ServerProperty,
};
