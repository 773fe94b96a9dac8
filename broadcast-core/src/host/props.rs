use std::sync::Arc;

use serde::Deserialize;

use crate::models::config::{
    AspectMode, CameraPosition, ConfigurationPreset, CustomAudioConfig, CustomVideoConfig,
    LogLevel,
};
use crate::models::error::BroadcastError;
use crate::session::controller::{PreviewOf, SessionController};
use crate::traits::broadcast_engine::BroadcastEngine;

/// Properties the host view sets on the broadcast component.
///
/// Absent fields leave the controller untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HostProps {
    pub rtmps_url: Option<String>,
    pub stream_key: Option<String>,
    pub configuration_preset: Option<ConfigurationPreset>,
    pub video_config: Option<CustomVideoConfig>,
    pub audio_config: Option<CustomAudioConfig>,
    pub log_level: Option<LogLevel>,
    pub session_log_level: Option<LogLevel>,
    pub camera_position: Option<CameraPosition>,
    pub is_muted: Option<bool>,
    pub camera_preview_aspect_mode: Option<AspectMode>,
    pub is_camera_preview_mirrored: Option<bool>,
}

impl HostProps {
    pub fn from_json(value: serde_json::Value) -> Result<Self, BroadcastError> {
        serde_json::from_value(value)
            .map_err(|e| BroadcastError::Configuration(format!("invalid props: {}", e)))
    }

    /// Destination URL and stream key, when both were provided.
    pub fn destination(&self) -> Option<(&str, &str)> {
        Some((self.rtmps_url.as_deref()?, self.stream_key.as_deref()?))
    }
}

/// Shared preview sink for props that may produce several previews.
pub type PreviewSink<P> = Arc<dyn Fn(P) + Send + Sync + 'static>;

/// Route each present prop to its controller setter.
///
/// Configuration props are applied before device props, so a single update
/// carrying both seeds the pending configuration first. The destination is
/// not applied here; hosts pass it to `start`.
pub fn apply_props<E: BroadcastEngine>(
    controller: &mut SessionController<E>,
    props: &HostProps,
    on_preview: PreviewSink<PreviewOf<E>>,
) -> Result<(), BroadcastError> {
    if let Some(preset) = props.configuration_preset {
        controller.set_configuration_preset(Some(preset))?;
    }
    if let Some(video) = &props.video_config {
        controller.set_video_config(Some(video.clone()))?;
    }
    if let Some(audio) = &props.audio_config {
        controller.set_audio_config(Some(audio.clone()))?;
    }
    if let Some(level) = props.log_level {
        controller.set_log_level(level)?;
    }
    if let Some(level) = props.session_log_level {
        controller.set_session_log_level(level)?;
    }
    if let Some(position) = props.camera_position {
        controller.set_camera_position(position, forward_to(&on_preview))?;
    }
    if let Some(muted) = props.is_muted {
        controller.set_is_muted(muted)?;
    }
    if let Some(aspect_mode) = props.camera_preview_aspect_mode {
        controller.set_camera_preview_aspect_mode(aspect_mode, forward_to(&on_preview))?;
    }
    if let Some(mirrored) = props.is_camera_preview_mirrored {
        controller.set_is_camera_preview_mirrored(mirrored, forward_to(&on_preview))?;
    }
    Ok(())
}

fn forward_to<P: Send + 'static>(sink: &PreviewSink<P>) -> Box<dyn FnOnce(P) + Send + 'static> {
    let sink = Arc::clone(sink);
    Box::new(move |preview| sink(preview))
}
