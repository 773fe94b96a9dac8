//! Simulated device catalog.
//!
//! URNs follow the platform's `built-in_video:N` scheme so containment
//! lookups behave as they do on hardware.

use broadcast_core::models::devices::{DeviceDescriptor, DevicePosition};

pub const BACK_WIDE_URN: &str = "com.apple.avfoundation.avcapturedevice.built-in_video:0";
pub const FRONT_URN: &str = "com.apple.avfoundation.avcapturedevice.built-in_video:1";
pub const BACK_ULTRA_WIDE_URN: &str = "com.apple.avfoundation.avcapturedevice.built-in_video:5";
pub const MICROPHONE_URN: &str = "com.apple.avfoundation.avcapturedevice.built-in_audio:0";

/// A phone with front, back wide and back ultra-wide cameras plus one microphone.
///
/// The ultra-wide lens is listed before the wide one, so a naive
/// "first opposite camera" pick from the front lands on the wrong lens.
pub fn three_camera_catalog() -> Vec<DeviceDescriptor> {
    vec![
        DeviceDescriptor::camera(FRONT_URN, DevicePosition::Front, true).with_name("Front Camera"),
        DeviceDescriptor::camera(BACK_ULTRA_WIDE_URN, DevicePosition::Back, false)
            .with_name("Back Ultra Wide Camera"),
        DeviceDescriptor::camera(BACK_WIDE_URN, DevicePosition::Back, true).with_name("Back Camera"),
        DeviceDescriptor::microphone(MICROPHONE_URN, true).with_name("iPhone Microphone"),
    ]
}

/// One front and one back camera plus one microphone.
pub fn two_camera_catalog() -> Vec<DeviceDescriptor> {
    vec![
        DeviceDescriptor::camera(FRONT_URN, DevicePosition::Front, true).with_name("Front Camera"),
        DeviceDescriptor::camera(BACK_WIDE_URN, DevicePosition::Back, true).with_name("Back Camera"),
        DeviceDescriptor::microphone(MICROPHONE_URN, true).with_name("iPhone Microphone"),
    ]
}

/// Initial device list for a session: the default camera at `position` and
/// the default microphone.
pub fn preset_for(catalog: &[DeviceDescriptor], position: DevicePosition) -> Vec<DeviceDescriptor> {
    let camera = catalog
        .iter()
        .find(|d| d.is_camera() && d.position == position && d.is_default);
    let microphone = catalog.iter().find(|d| d.is_microphone() && d.is_default);
    camera.into_iter().chain(microphone).cloned().collect()
}
