use serde::{Deserialize, Serialize};

use super::error::BroadcastError;

/// Declares a closed set of host-facing names.
///
/// Unknown names are rejected with a `Configuration` error naming the value;
/// they never fall back to a default.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = BroadcastError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(BroadcastError::Configuration(format!(
                        "unsupported {}: {:?}",
                        $label, other
                    ))),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

named_enum! {
    /// Verbosity of the engine's own logging.
    LogLevel, "log level" {
        Debug => "debug",
        Error => "error",
        Info => "info",
        Warning => "warning",
    }
}

named_enum! {
    /// How the camera preview fills its view.
    AspectMode, "aspect mode" {
        None => "none",
        Fill => "fill",
        Fit => "fit",
    }
}

named_enum! {
    CameraPosition, "camera position" {
        Front => "front",
        Back => "back",
    }
}

named_enum! {
    AudioQuality, "audio quality" {
        Minimum => "minimum",
        Low => "low",
        Medium => "medium",
        High => "high",
        Maximum => "maximum",
    }
}

named_enum! {
    /// Process-wide routing policy for the host audio session.
    ///
    /// Applies to the whole process, not to one broadcast session. The value
    /// resolved at `initiate()` is handed to the engine right before the session
    /// is constructed; the last value set before initiation wins.
    AudioSessionStrategy, "audio session strategy" {
        RecordOnly => "recordOnly",
        PlayAndRecord => "playAndRecord",
        PlayAndRecordDefaultToSpeaker => "playAndRecordDefaultToSpeaker",
        NoAction => "noAction",
    }
}

named_enum! {
    AutoBitrateProfile, "automatic bitrate profile" {
        Conservative => "conservative",
        FastIncrease => "fastIncrease",
    }
}

named_enum! {
    /// Named configuration that seeds defaults before custom overrides apply.
    ConfigurationPreset, "configuration preset" {
        StandardPortrait => "standardPortrait",
        StandardLandscape => "standardLandscape",
        BasicPortrait => "basicPortrait",
        BasicLandscape => "basicLandscape",
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Error
    }
}

impl Default for AspectMode {
    fn default() -> Self {
        Self::None
    }
}

impl Default for CameraPosition {
    fn default() -> Self {
        Self::Back
    }
}

impl Default for AutoBitrateProfile {
    fn default() -> Self {
        Self::Conservative
    }
}

pub const MIN_VIDEO_DIMENSION: u32 = 160;
pub const MAX_VIDEO_DIMENSION: u32 = 1920;
pub const MAX_VIDEO_PIXELS: u32 = 1920 * 1080;
pub const MIN_VIDEO_BITRATE: u32 = 100_000;
pub const MAX_VIDEO_BITRATE: u32 = 8_500_000;
pub const MIN_FRAME_RATE: u32 = 10;
pub const MAX_FRAME_RATE: u32 = 60;
pub const MIN_KEYFRAME_INTERVAL: f32 = 1.0;
pub const MAX_KEYFRAME_INTERVAL: f32 = 5.0;
pub const MIN_AUDIO_BITRATE: u32 = 64_000;
pub const MAX_AUDIO_BITRATE: u32 = 160_000;

fn check_range<T: PartialOrd + std::fmt::Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<T, String> {
    if value < min || value > max {
        return Err(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        ));
    }
    Ok(value)
}

/// Video encoder configuration.
///
/// Range-checked fields are set through the `set_*` methods, which return the
/// rejection message on failure. `validate` re-checks everything, including
/// the bitrate ordering that only holds once all overrides are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoConfiguration {
    pub width: u32,
    pub height: u32,
    pub initial_bitrate: u32,
    pub min_bitrate: u32,
    pub max_bitrate: u32,
    pub target_frame_rate: u32,
    /// Seconds between keyframes.
    pub keyframe_interval: f32,
    pub uses_b_frames: bool,
    pub use_auto_bitrate: bool,
    pub auto_bitrate_profile: AutoBitrateProfile,
    pub enable_transparency: bool,
}

impl VideoConfiguration {
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), String> {
        check_range("width", width, MIN_VIDEO_DIMENSION, MAX_VIDEO_DIMENSION)?;
        check_range("height", height, MIN_VIDEO_DIMENSION, MAX_VIDEO_DIMENSION)?;
        if width * height > MAX_VIDEO_PIXELS {
            return Err(format!(
                "size {}x{} exceeds the maximum of {} pixels",
                width, height, MAX_VIDEO_PIXELS
            ));
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn set_initial_bitrate(&mut self, bitrate: u32) -> Result<(), String> {
        self.initial_bitrate =
            check_range("initial bitrate", bitrate, MIN_VIDEO_BITRATE, MAX_VIDEO_BITRATE)?;
        Ok(())
    }

    pub fn set_min_bitrate(&mut self, bitrate: u32) -> Result<(), String> {
        self.min_bitrate =
            check_range("min bitrate", bitrate, MIN_VIDEO_BITRATE, MAX_VIDEO_BITRATE)?;
        Ok(())
    }

    pub fn set_max_bitrate(&mut self, bitrate: u32) -> Result<(), String> {
        self.max_bitrate =
            check_range("max bitrate", bitrate, MIN_VIDEO_BITRATE, MAX_VIDEO_BITRATE)?;
        Ok(())
    }

    pub fn set_target_frame_rate(&mut self, frame_rate: u32) -> Result<(), String> {
        self.target_frame_rate =
            check_range("target frame rate", frame_rate, MIN_FRAME_RATE, MAX_FRAME_RATE)?;
        Ok(())
    }

    pub fn set_keyframe_interval(&mut self, seconds: f32) -> Result<(), String> {
        self.keyframe_interval = check_range(
            "keyframe interval",
            seconds,
            MIN_KEYFRAME_INTERVAL,
            MAX_KEYFRAME_INTERVAL,
        )?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        self.clone().set_size(self.width, self.height)?;
        check_range("initial bitrate", self.initial_bitrate, MIN_VIDEO_BITRATE, MAX_VIDEO_BITRATE)?;
        check_range("min bitrate", self.min_bitrate, MIN_VIDEO_BITRATE, MAX_VIDEO_BITRATE)?;
        check_range("max bitrate", self.max_bitrate, MIN_VIDEO_BITRATE, MAX_VIDEO_BITRATE)?;
        check_range("target frame rate", self.target_frame_rate, MIN_FRAME_RATE, MAX_FRAME_RATE)?;
        check_range(
            "keyframe interval",
            self.keyframe_interval,
            MIN_KEYFRAME_INTERVAL,
            MAX_KEYFRAME_INTERVAL,
        )?;
        if self.min_bitrate > self.initial_bitrate || self.initial_bitrate > self.max_bitrate {
            return Err(format!(
                "bitrates must satisfy min <= initial <= max, got {} / {} / {}",
                self.min_bitrate, self.initial_bitrate, self.max_bitrate
            ));
        }
        Ok(())
    }

    fn preset(width: u32, height: u32, initial: u32, max: u32) -> Self {
        Self {
            width,
            height,
            initial_bitrate: initial,
            max_bitrate: max,
            ..Self::default()
        }
    }
}

impl Default for VideoConfiguration {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            initial_bitrate: 2_100_000,
            min_bitrate: 300_000,
            max_bitrate: 6_000_000,
            target_frame_rate: 30,
            keyframe_interval: 2.0,
            uses_b_frames: true,
            use_auto_bitrate: true,
            auto_bitrate_profile: AutoBitrateProfile::Conservative,
            enable_transparency: false,
        }
    }
}

/// Audio encoder configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioConfiguration {
    pub bitrate: u32,
    pub channels: u8,
    pub quality: AudioQuality,
}

impl AudioConfiguration {
    pub fn set_bitrate(&mut self, bitrate: u32) -> Result<(), String> {
        self.bitrate = check_range("audio bitrate", bitrate, MIN_AUDIO_BITRATE, MAX_AUDIO_BITRATE)?;
        Ok(())
    }

    pub fn set_channels(&mut self, channels: u8) -> Result<(), String> {
        self.channels = check_range("channels", channels, 1, 2)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        check_range("audio bitrate", self.bitrate, MIN_AUDIO_BITRATE, MAX_AUDIO_BITRATE)?;
        check_range("channels", self.channels, 1, 2)?;
        Ok(())
    }
}

impl Default for AudioConfiguration {
    fn default() -> Self {
        Self {
            bitrate: 96_000,
            channels: 2,
            quality: AudioQuality::Medium,
        }
    }
}

impl ConfigurationPreset {
    /// Video defaults seeded by this preset.
    pub fn video(&self) -> VideoConfiguration {
        match self {
            Self::StandardPortrait => VideoConfiguration::preset(720, 1280, 2_100_000, 3_500_000),
            Self::StandardLandscape => VideoConfiguration::preset(1280, 720, 2_100_000, 3_500_000),
            Self::BasicPortrait => VideoConfiguration::preset(480, 852, 1_000_000, 1_500_000),
            Self::BasicLandscape => VideoConfiguration::preset(852, 480, 1_000_000, 1_500_000),
        }
    }

    pub fn audio(&self) -> AudioConfiguration {
        AudioConfiguration::default()
    }
}

/// Preview presentation settings, changeable at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewSettings {
    pub aspect_mode: AspectMode,
    pub mirrored: bool,
}

/// The configuration a broadcast session is constructed with.
///
/// Immutable once the session exists. Only the session log level, mute,
/// preview settings and camera position (through a swap) change afterwards,
/// and those through their runtime setters rather than through this value.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfiguration {
    pub preset: Option<ConfigurationPreset>,
    pub video: VideoConfiguration,
    pub audio: AudioConfiguration,
    /// Log level baked into the engine configuration.
    pub log_level: LogLevel,
    /// Log level applied to the live session right after construction.
    pub session_log_level: LogLevel,
    pub audio_session_strategy: Option<AudioSessionStrategy>,
    pub initial_camera_position: CameraPosition,
    pub initial_muted: bool,
    pub preview: PreviewSettings,
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            preset: None,
            video: VideoConfiguration::default(),
            audio: AudioConfiguration::default(),
            log_level: LogLevel::Error,
            session_log_level: LogLevel::Error,
            audio_session_strategy: None,
            initial_camera_position: CameraPosition::Back,
            initial_muted: false,
            preview: PreviewSettings::default(),
        }
    }
}

/// Custom video overrides, applied field by field over the preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomVideoConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bitrate: Option<u32>,
    pub target_frame_rate: Option<u32>,
    pub keyframe_interval: Option<u32>,
    #[serde(rename = "isBFrames")]
    pub is_b_frames: Option<bool>,
    pub is_auto_bitrate: Option<bool>,
    pub max_bitrate: Option<u32>,
    pub min_bitrate: Option<u32>,
    pub auto_bitrate_profile: Option<AutoBitrateProfile>,
}

/// Custom audio overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomAudioConfig {
    pub bitrate: Option<u32>,
    pub channels: Option<u8>,
    pub quality: Option<AudioQuality>,
    pub audio_session_strategy: Option<AudioSessionStrategy>,
}
