use crate::models::config::{
    AspectMode, AudioConfiguration, CameraPosition, ConfigurationPreset, CustomAudioConfig,
    CustomVideoConfig, LogLevel, PreviewSettings, SessionConfiguration, VideoConfiguration,
};
use crate::models::error::BroadcastError;

/// Merge a preset (or engine defaults) with custom overrides.
///
/// Overrides are applied field by field through the range-checked setters;
/// the first rejection is returned as `BroadcastError::Configuration` carrying
/// the setter's message. Width and height must be given together.
pub fn resolve_configuration(
    preset: Option<ConfigurationPreset>,
    video: Option<&CustomVideoConfig>,
    audio: Option<&CustomAudioConfig>,
) -> Result<SessionConfiguration, BroadcastError> {
    let (mut video_config, mut audio_config) = match preset {
        Some(preset) => (preset.video(), preset.audio()),
        None => (VideoConfiguration::default(), AudioConfiguration::default()),
    };

    if let Some(custom) = video {
        apply_video(&mut video_config, custom).map_err(BroadcastError::Configuration)?;
    }

    let mut audio_session_strategy = None;
    if let Some(custom) = audio {
        apply_audio(&mut audio_config, custom).map_err(BroadcastError::Configuration)?;
        audio_session_strategy = custom.audio_session_strategy;
    }

    video_config.validate().map_err(BroadcastError::Configuration)?;
    audio_config.validate().map_err(BroadcastError::Configuration)?;

    Ok(SessionConfiguration {
        preset,
        video: video_config,
        audio: audio_config,
        audio_session_strategy,
        ..SessionConfiguration::default()
    })
}

fn apply_video(config: &mut VideoConfiguration, custom: &CustomVideoConfig) -> Result<(), String> {
    match (custom.width, custom.height) {
        (Some(width), Some(height)) => config.set_size(width, height)?,
        (None, None) => {}
        _ => {
            return Err(
                "`width` and `height` are interrelated and can not be set separately".into(),
            )
        }
    }
    if let Some(bitrate) = custom.bitrate {
        config.set_initial_bitrate(bitrate)?;
    }
    if let Some(frame_rate) = custom.target_frame_rate {
        config.set_target_frame_rate(frame_rate)?;
    }
    if let Some(interval) = custom.keyframe_interval {
        config.set_keyframe_interval(interval as f32)?;
    }
    if let Some(b_frames) = custom.is_b_frames {
        config.uses_b_frames = b_frames;
    }
    if let Some(auto_bitrate) = custom.is_auto_bitrate {
        config.use_auto_bitrate = auto_bitrate;
    }
    if let Some(max) = custom.max_bitrate {
        config.set_max_bitrate(max)?;
    }
    if let Some(min) = custom.min_bitrate {
        config.set_min_bitrate(min)?;
    }
    if let Some(profile) = custom.auto_bitrate_profile {
        config.auto_bitrate_profile = profile;
    }
    Ok(())
}

fn apply_audio(config: &mut AudioConfiguration, custom: &CustomAudioConfig) -> Result<(), String> {
    if let Some(bitrate) = custom.bitrate {
        config.set_bitrate(bitrate)?;
    }
    if let Some(channels) = custom.channels {
        config.set_channels(channels)?;
    }
    if let Some(quality) = custom.quality {
        config.quality = quality;
    }
    Ok(())
}

/// Configuration recorded before the session exists.
///
/// Every setter is last-write-wins. `resolve` runs exactly once, at `initiate()`.
#[derive(Debug, Clone, Default)]
pub struct PendingConfiguration {
    pub preset: Option<ConfigurationPreset>,
    pub video: Option<CustomVideoConfig>,
    pub audio: Option<CustomAudioConfig>,
    pub log_level: LogLevel,
    pub session_log_level: LogLevel,
    pub initial_camera_position: CameraPosition,
    pub initial_muted: bool,
    pub aspect_mode: AspectMode,
    pub mirrored: bool,
}

impl PendingConfiguration {
    pub fn resolve(&self) -> Result<SessionConfiguration, BroadcastError> {
        let mut configuration =
            resolve_configuration(self.preset, self.video.as_ref(), self.audio.as_ref())?;
        configuration.log_level = self.log_level;
        configuration.session_log_level = self.session_log_level;
        configuration.initial_camera_position = self.initial_camera_position;
        configuration.initial_muted = self.initial_muted;
        configuration.preview = PreviewSettings {
            aspect_mode: self.aspect_mode,
            mirrored: self.mirrored,
        };
        Ok(configuration)
    }
}
