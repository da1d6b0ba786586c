//! Scoped preview handles for locally picked images.
//!
//! A handle is acquired when a media fragment referencing a local file is
//! written to the draft and released when it is dropped, either because the
//! fragment was replaced or because the draft was discarded.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use uuid::Uuid;

type LiveSet = Arc<Mutex<BTreeMap<Uuid, String>>>;

// A panic elsewhere must not stop previews from being counted or released.
fn lock(live: &LiveSet) -> MutexGuard<'_, BTreeMap<Uuid, String>> {
    live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Tracks every preview currently held, across all handles it issued.
#[derive(Debug, Clone, Default)]
pub struct PreviewTracker {
    live: LiveSet,
}

impl PreviewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, path: &str) -> PreviewHandle {
        let id = Uuid::new_v4();
        lock(&self.live).insert(id, path.to_string());
        tracing::trace!(%id, path, "preview acquired");
        PreviewHandle {
            id,
            path: path.to_string(),
            live: Arc::clone(&self.live),
        }
    }

    pub fn live_count(&self) -> usize {
        lock(&self.live).len()
    }

    pub fn is_live(&self, id: Uuid) -> bool {
        lock(&self.live).contains_key(&id)
    }
}

/// Preview of one local file. Released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    path: String,
    live: LiveSet,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Opaque url the presentation layer renders in place of the file.
    pub fn url(&self) -> String {
        format!("preview://{}", self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        lock(&self.live).remove(&self.id);
        tracing::trace!(id = %self.id, "preview released");
    }
}
