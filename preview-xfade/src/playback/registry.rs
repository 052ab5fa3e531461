//! Audio handle registry
//!
//! Owns one [`AudioHandle`] per list item that has been asked to play. A
//! handle holds the item's audio resource exclusively and lives until the
//! list is replaced or the controller is disposed.

use super::ramp::RampOperation;
use crate::audio::{AudioBackend, AudioResource};
use preview_common::{HandleState, ItemId, RampDirection};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Owned state and resource binding for one item's preview
pub struct AudioHandle {
    item_id: ItemId,
    source_url: String,
    pub(crate) resource: Box<dyn AudioResource>,
    pub(crate) state: HandleState,
    /// Ramp level in [0.0, 1.0], before curve shaping
    pub(crate) volume: f32,
    pub(crate) active_ramp: Option<RampOperation>,
    /// Number of the latest `play()`, unique across all handles; outcomes
    /// carrying any other number are stale
    pub(crate) play_attempt: u64,
}

impl AudioHandle {
    fn new(item_id: ItemId, source_url: &str, mut resource: Box<dyn AudioResource>) -> Self {
        resource.load(source_url);
        resource.set_volume(0.0);

        Self {
            item_id,
            source_url: source_url.to_string(),
            resource,
            state: HandleState::Idle,
            volume: 0.0,
            active_ramp: None,
            play_attempt: 0,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Direction of the running ramp, if any
    pub fn ramp_direction(&self) -> Option<RampDirection> {
        self.active_ramp.as_ref().map(RampOperation::direction)
    }

    /// Cancel the ramp and free the resource
    fn teardown(&mut self) {
        // Dropping the operation aborts its timer
        self.active_ramp = None;
        self.resource.pause();
        self.resource.release();
    }
}

/// Collection of audio handles keyed by item
pub struct HandleRegistry {
    backend: Arc<dyn AudioBackend>,
    handles: HashMap<ItemId, AudioHandle>,
}

impl HandleRegistry {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            handles: HashMap::new(),
        }
    }

    /// Return the item's handle, creating an `Idle` one bound to `source_url`
    /// if the item has none yet
    ///
    /// An existing handle keeps its original source.
    pub fn get_or_create(&mut self, item_id: &ItemId, source_url: &str) -> &mut AudioHandle {
        let backend = &self.backend;
        let handle = self.handles.entry(item_id.clone()).or_insert_with(|| {
            debug!("Creating audio handle for {}", item_id);
            AudioHandle::new(item_id.clone(), source_url, backend.create())
        });

        if handle.source_url != source_url {
            debug!(
                "Ignoring new source for {}: keeping {}",
                item_id, handle.source_url
            );
        }

        handle
    }

    pub fn get(&self, item_id: &ItemId) -> Option<&AudioHandle> {
        self.handles.get(item_id)
    }

    pub fn get_mut(&mut self, item_id: &ItemId) -> Option<&mut AudioHandle> {
        self.handles.get_mut(item_id)
    }

    /// Tear down and remove one handle
    ///
    /// Returns false (and does nothing) if the item has no handle.
    pub fn release(&mut self, item_id: &ItemId) -> bool {
        match self.handles.remove(item_id) {
            Some(mut handle) => {
                handle.teardown();
                debug!("Released audio handle for {}", item_id);
                true
            }
            None => false,
        }
    }

    /// Tear down every handle regardless of state
    ///
    /// Returns the number of handles released.
    pub fn release_all(&mut self) -> usize {
        let count = self.handles.len();
        for (_, mut handle) in self.handles.drain() {
            handle.teardown();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AudioHandle> {
        self.handles.values()
    }
}

impl Drop for HandleRegistry {
    fn drop(&mut self) {
        self.release_all();
    }
}
