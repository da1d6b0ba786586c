#![doc(test(attr(deny(warnings))))]

//! Property Wizard drives the multi-step property listing flow: per-step
//! validation, draft accumulation, record assembly, edit-mode hydration and
//! single-flight submission through an authenticated REST client.

pub mod api;
pub mod config;
pub mod errors;
pub mod session;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Property wizard tracing initialized.");
    });
}
