use std::collections::HashMap;
use std::sync::Arc;

use crate::models::devices::{DeviceDescriptor, DevicePosition};
use crate::traits::broadcast_engine::ImageSource;

/// URNs of the devices currently attached to the session, by role.
///
/// Tracks identity only; the engine owns the devices themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachedDeviceRegistry {
    camera_urn: Option<String>,
    microphone_urn: Option<String>,
}

impl AttachedDeviceRegistry {
    /// Record the first camera and first microphone of an initial device list.
    pub fn from_descriptors(descriptors: &[DeviceDescriptor]) -> Self {
        Self {
            camera_urn: descriptors
                .iter()
                .find(|d| d.is_camera())
                .map(|d| d.urn.clone()),
            microphone_urn: descriptors
                .iter()
                .find(|d| d.is_microphone())
                .map(|d| d.urn.clone()),
        }
    }

    pub fn camera_urn(&self) -> Option<&str> {
        self.camera_urn.as_deref()
    }

    pub fn microphone_urn(&self) -> Option<&str> {
        self.microphone_urn.as_deref()
    }

    pub fn set_camera(&mut self, urn: String) {
        self.camera_urn = Some(urn);
    }

    pub fn clear(&mut self) {
        self.camera_urn = None;
        self.microphone_urn = None;
    }
}

/// Find the attached device whose URN contains `urn`.
pub fn find_attached<'a>(
    attached: &'a [DeviceDescriptor],
    urn: &str,
) -> Option<&'a DeviceDescriptor> {
    attached.iter().find(|d| d.urn.contains(urn))
}

/// Pick the camera to swap to from `attached`.
///
/// Candidates are cameras at a different position. When more than two
/// cameras exist and a front camera is attached, only the default back
/// camera qualifies, so devices with several back lenses land on the main one.
pub fn select_next_camera<'a>(
    attached: &DeviceDescriptor,
    available: &'a [DeviceDescriptor],
) -> Option<&'a DeviceDescriptor> {
    let cameras: Vec<&DeviceDescriptor> = available.iter().filter(|d| d.is_camera()).collect();
    let prefer_default = cameras.len() > 2 && attached.position == DevicePosition::Front;

    cameras.into_iter().find(|candidate| {
        let is_opposite = candidate.position != attached.position;
        if prefer_default {
            is_opposite && candidate.is_default
        } else {
            is_opposite
        }
    })
}

/// Live image sources, one per mixer slot name.
#[derive(Default)]
pub struct SlotSourceRegistry {
    sources: HashMap<String, Arc<dyn ImageSource>>,
}

impl SlotSourceRegistry {
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ImageSource>> {
        self.sources.get(name)
    }

    /// Remove the source for `name`, handing ownership to the caller for detaching.
    pub fn take(&mut self, name: &str) -> Option<Arc<dyn ImageSource>> {
        self.sources.remove(name)
    }

    /// Register `source` under `name`, returning any source it displaced.
    pub fn insert(&mut self, name: &str, source: Arc<dyn ImageSource>) -> Option<Arc<dyn ImageSource>> {
        self.sources.insert(name.to_string(), source)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Release every source.
    pub fn clear(&mut self) {
        self.sources.clear();
    }
}
