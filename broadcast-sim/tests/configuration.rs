mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use broadcast_core::host::props::PreviewSink;
use broadcast_core::models::config::{AudioQuality, CameraPosition};
use broadcast_core::{
    apply_props, AudioConfiguration, BroadcastError, ConfigurationPreset, CustomVideoConfig,
    HostProps,
};
use broadcast_sim::catalog::{FRONT_URN, MICROPHONE_URN};
use broadcast_sim::{SimPreview, SimulatedEngine};

use common::controller;

fn preview_sink() -> (PreviewSink<SimPreview>, Arc<Mutex<Vec<SimPreview>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink_received = Arc::clone(&received);
    let sink: PreviewSink<SimPreview> = Arc::new(move |preview| sink_received.lock().push(preview));
    (sink, received)
}

#[test]
fn standard_landscape_with_bitrate_overrides() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller
        .set_configuration_preset(Some(ConfigurationPreset::StandardLandscape))
        .unwrap();
    controller
        .set_video_config(Some(CustomVideoConfig {
            bitrate: Some(7_500_000),
            max_bitrate: Some(8_500_000),
            ..CustomVideoConfig::default()
        }))
        .unwrap();

    controller.initiate().unwrap();

    let config = engine.last_configuration().unwrap();
    let preset = ConfigurationPreset::StandardLandscape.video();
    assert_eq!(config.preset, Some(ConfigurationPreset::StandardLandscape));
    assert_eq!(config.video.initial_bitrate, 7_500_000);
    assert_eq!(config.video.max_bitrate, 8_500_000);
    assert_eq!(config.video.width, preset.width);
    assert_eq!(config.video.height, preset.height);
    assert_eq!(config.video.min_bitrate, preset.min_bitrate);
    assert_eq!(config.video.target_frame_rate, preset.target_frame_rate);
    assert_eq!(config.video.keyframe_interval, preset.keyframe_interval);
    assert_eq!(config.video.uses_b_frames, preset.uses_b_frames);
    assert_eq!(config.video.use_auto_bitrate, preset.use_auto_bitrate);
    assert_eq!(config.audio, AudioConfiguration::default());
    assert!(config.video.enable_transparency);
    assert_eq!(controller.configuration(), Some(&config));
}

#[test]
fn out_of_range_override_names_the_field() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller
        .set_video_config(Some(CustomVideoConfig {
            target_frame_rate: Some(240),
            ..CustomVideoConfig::default()
        }))
        .unwrap();

    match controller.initiate() {
        Err(BroadcastError::Configuration(message)) => {
            assert!(message.contains("frame rate"), "{message}")
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(engine.sessions_created(), 0);
}

#[test]
fn configuration_set_after_initiate_leaves_live_session_alone() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    let live = controller.configuration().cloned().unwrap();

    controller
        .set_configuration_preset(Some(ConfigurationPreset::BasicPortrait))
        .unwrap();
    controller
        .set_video_config(Some(CustomVideoConfig {
            bitrate: Some(500_000),
            ..CustomVideoConfig::default()
        }))
        .unwrap();

    assert_eq!(controller.configuration(), Some(&live));
    assert_eq!(engine.sessions_created(), 1);
}

#[test]
fn host_props_configure_the_session() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    let props = HostProps::from_json(json!({
        "configurationPreset": "basicPortrait",
        "videoConfig": {"targetFrameRate": 24, "isBFrames": false},
        "audioConfig": {"quality": "high", "channels": 1},
        "cameraPosition": "front",
        "isMuted": true,
        "isCameraPreviewMirrored": true
    }))
    .unwrap();
    let (sink, received) = preview_sink();

    apply_props(&mut controller, &props, sink).unwrap();
    controller.initiate().unwrap();

    let config = controller.configuration().unwrap();
    assert_eq!(config.preset, Some(ConfigurationPreset::BasicPortrait));
    assert_eq!((config.video.width, config.video.height), (480, 852));
    assert_eq!(config.video.target_frame_rate, 24);
    assert!(!config.video.uses_b_frames);
    assert_eq!(config.audio.quality, AudioQuality::High);
    assert_eq!(config.audio.channels, 1);
    assert_eq!(config.initial_camera_position, CameraPosition::Front);
    assert!(config.preview.mirrored);

    let session = engine.last_session().unwrap();
    assert_eq!(session.attached_camera().unwrap().urn, FRONT_URN);
    assert_eq!(session.gain(MICROPHONE_URN), Some(0.0));
    assert!(received.lock().is_empty());
}

#[test]
fn host_props_after_initiate_drive_the_device_pipeline() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    let props = HostProps::from_json(json!({
        "cameraPosition": "front",
        "cameraPreviewAspectMode": "fit"
    }))
    .unwrap();
    let (sink, received) = preview_sink();

    apply_props(&mut controller, &props, sink).unwrap();

    let session = engine.last_session().unwrap();
    assert_eq!(session.attached_camera().unwrap().urn, FRONT_URN);
    let previews = received.lock();
    assert_eq!(previews.len(), 2);
    assert_eq!(previews[1].camera_urn.as_deref(), Some(FRONT_URN));
}

#[test]
fn unknown_preset_name_is_rejected_with_its_value() {
    let err = HostProps::from_json(json!({"configurationPreset": "ultraPortrait"})).unwrap_err();

    match err {
        BroadcastError::Configuration(message) => {
            assert!(message.contains("ultraPortrait"), "{message}")
        }
        other => panic!("unexpected error {other:?}"),
    }
}
