use super::config::{AspectMode, CameraPosition};
use super::error::BroadcastError;

/// Kind of device in the engine's device graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Camera,
    Microphone,
    UserImage,
    UserAudio,
    Unknown,
}

/// Physical placement of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DevicePosition {
    Front,
    Back,
    Unknown,
}

impl From<CameraPosition> for DevicePosition {
    fn from(position: CameraPosition) -> Self {
        match position {
            CameraPosition::Front => Self::Front,
            CameraPosition::Back => Self::Back,
        }
    }
}

/// Description of a device the engine can attach.
///
/// The URN uniquely identifies the device; the engine owns its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub urn: String,
    pub friendly_name: String,
    pub device_type: DeviceType,
    pub position: DevicePosition,
    /// Whether the platform considers this the default device for its position.
    pub is_default: bool,
}

impl DeviceDescriptor {
    pub fn camera(urn: &str, position: DevicePosition, is_default: bool) -> Self {
        Self {
            urn: urn.to_string(),
            friendly_name: urn.to_string(),
            device_type: DeviceType::Camera,
            position,
            is_default,
        }
    }

    pub fn microphone(urn: &str, is_default: bool) -> Self {
        Self {
            urn: urn.to_string(),
            friendly_name: urn.to_string(),
            device_type: DeviceType::Microphone,
            position: DevicePosition::Unknown,
            is_default,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.friendly_name = name.to_string();
        self
    }

    pub fn is_camera(&self) -> bool {
        self.device_type == DeviceType::Camera
    }

    pub fn is_microphone(&self) -> bool {
        self.device_type == DeviceType::Microphone
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.origin.x + self.size.width / 2.0,
            y: self.origin.y + self.size.height / 2.0,
        }
    }
}

/// Preferred input for a mixer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotInput {
    Camera,
    Microphone,
    UserImage,
    UserAudio,
    Unknown,
}

/// Placement and binding of one mixer slot on the video canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct MixerSlotConfiguration {
    pub name: String,
    /// Position and size in canvas units.
    pub frame: Rect,
    pub z_index: i32,
    pub aspect: AspectMode,
    pub preferred_video_input: SlotInput,
    pub preferred_audio_input: SlotInput,
}

impl MixerSlotConfiguration {
    /// A slot composited above the camera that shows a user-supplied image.
    pub fn user_image(name: &str, frame: Rect) -> Result<Self, BroadcastError> {
        if name.trim().is_empty() {
            return Err(BroadcastError::Configuration(
                "slot name must not be empty".into(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            frame,
            z_index: 2,
            aspect: AspectMode::Fit,
            preferred_video_input: SlotInput::UserImage,
            preferred_audio_input: SlotInput::Unknown,
        })
    }
}

/// A single rasterized still image in 32-bit BGRA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillFrame {
    pub width: u32,
    pub height: u32,
    pub bgra: Vec<u8>,
}

impl StillFrame {
    pub fn from_bgra(width: u32, height: u32, bgra: Vec<u8>) -> Result<Self, BroadcastError> {
        let expected = width as usize * height as usize * 4;
        if bgra.len() != expected {
            return Err(BroadcastError::Configuration(format!(
                "frame of {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                bgra.len()
            )));
        }
        Ok(Self { width, height, bgra })
    }
}
